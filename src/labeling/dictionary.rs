//! Weighted keyword tables for the two tracks.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::{AbstrakError, Result};
use crate::track::Track;

/// Networking keywords and their weights.
pub const TKJ_KEYWORDS: &[(&str, u32)] = &[
    ("routing", 2), ("switching", 2), ("vlan", 2), ("qos", 3), ("latency", 2),
    ("packet loss", 3), ("throughput", 3), ("mikrotik", 3), ("cisco", 2),
    ("firewall", 2), ("ids", 2), ("vpn", 2), ("wlan", 2), ("topologi", 2), ("sdn", 2),
    ("nfv", 2), ("ipv6", 2), ("lora", 2), ("mqtt", 2), ("coap", 2), ("bandwidth", 2),
    ("server", 1), ("virtualisasi", 2), ("mesh", 2), ("qoe", 2), ("ethernet", 2),
    ("lan", 2), ("wan", 2), ("man", 2), ("hotspot", 2), ("konfigurasi jaringan", 3),
    ("ip address", 2), ("subnet", 2), ("routing static", 2), ("routing dynamic", 2),
    ("ospf", 3), ("rip", 3), ("bgp", 3), ("dns", 2), ("dhcp", 2), ("web server", 2),
    ("proxy", 2), ("load balancing", 2), ("monitoring jaringan", 3), ("snmp", 2),
    ("wireshark", 2), ("packet tracer", 2), ("ftp", 1), ("smtp", 1), ("ssh", 1),
    ("iot network", 2), ("esp32", 2), ("arduino", 2), ("raspberry pi", 2),
    ("sensor", 2), ("gateway", 2), ("komunikasi data", 3), ("wireless", 2),
    ("antena", 2), ("keamanan jaringan", 3), ("jitter", 2), ("throughput jaringan", 3),
    ("latency jaringan", 3), ("bandwidth usage", 2), ("trafik jaringan", 3),
    ("pengujian qos", 3), ("analisis qos", 3),
];

/// Software engineering keywords and their weights.
pub const RPL_KEYWORDS: &[(&str, u32)] = &[
    ("sdlc", 2), ("agile", 2), ("scrum", 2), ("uml", 2), ("erd", 2), ("dfd", 2),
    ("use case", 2), ("activity diagram", 2), ("class diagram", 2),
    ("sequence diagram", 2), ("api", 2), ("rest", 2), ("restful", 2), ("graphql", 2),
    ("json", 1), ("microservice", 2), ("monolith", 1), ("database", 2),
    ("basis data", 2), ("query", 1), ("sql", 1), ("frontend", 1), ("backend", 1),
    ("react", 2), ("next.js", 2), ("laravel", 2), ("vue", 2), ("angular", 2),
    ("flutter", 2), ("android studio", 2), ("java", 1), ("python", 1), ("node.js", 2),
    ("express", 2), ("typescript", 2), ("php", 1), ("pengujian", 2), ("black box", 2),
    ("white box", 2), ("unit test", 2), ("integrasi", 2), ("coverage", 2), ("sus", 3),
    ("usability", 2), ("ui/ux", 2), ("antarmuka", 1), ("user experience", 2),
    ("deploy", 2), ("deployment", 2), ("ci/cd", 2), ("framework", 1), ("akurasi", 2),
    ("precision", 2), ("recall", 2), ("f1", 2), ("mae", 2), ("mse", 2), ("rmse", 2),
    ("machine learning", 2), ("knn", 2), ("naive bayes", 2), ("decision tree", 2),
    ("svm", 2), ("clustering", 2), ("kmeans", 2), ("data mining", 2),
    ("text mining", 2), ("refactor", 1), ("arsitektur", 1), ("design pattern", 2),
    ("mvc", 2), ("sistem informasi", 3), ("perangkat lunak", 2), ("aplikasi", 3),
    ("prototype", 2), ("waterfall", 2), ("spiral", 2), ("incremental", 2),
    ("scrum master", 1), ("kanban", 1), ("useability", 2), ("evaluasi sistem", 2),
    ("implementasi aplikasi", 3), ("pengembangan aplikasi", 3),
    ("pengujian sistem", 3), ("dashboard", 2), ("login", 1), ("auth", 1),
    ("token", 1), ("jwt", 1), ("role", 1), ("middleware", 1), ("web service", 2),
    ("json response", 1), ("backend api", 2), ("integration", 2),
    ("manajemen proyek", 2), ("wbs", 1), ("gantt", 1), ("stakeholder", 1),
];

/// Built-in networking table.
pub static TKJ_DICTIONARY: LazyLock<Arc<KeywordDictionary>> = LazyLock::new(|| {
    Arc::new(
        KeywordDictionary::new(Track::Tkj, TKJ_KEYWORDS)
            .expect("built-in keywords compile to valid patterns"),
    )
});

/// Built-in software engineering table.
pub static RPL_DICTIONARY: LazyLock<Arc<KeywordDictionary>> = LazyLock::new(|| {
    Arc::new(
        KeywordDictionary::new(Track::Rpl, RPL_KEYWORDS)
            .expect("built-in keywords compile to valid patterns"),
    )
});

/// One keyword with its weight and compiled whole-word pattern.
pub struct WeightedKeyword {
    pub keyword: String,
    pub weight: u32,
    pattern: Regex,
}

impl WeightedKeyword {
    /// Number of non-overlapping whole-word occurrences in lowercase text.
    pub fn count(&self, lowercase_text: &str) -> usize {
        self.pattern.find_iter(lowercase_text).count()
    }

    pub fn is_match(&self, lowercase_text: &str) -> bool {
        self.pattern.is_match(lowercase_text)
    }
}

impl fmt::Debug for WeightedKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedKeyword")
            .field("keyword", &self.keyword)
            .field("weight", &self.weight)
            .finish()
    }
}

/// A weighted keyword table for one track. Entry order is preserved.
#[derive(Debug)]
pub struct KeywordDictionary {
    track: Track,
    entries: Vec<WeightedKeyword>,
}

impl KeywordDictionary {
    /// Compile a table. Keywords are lowercased and matched as whole words.
    pub fn new<S: AsRef<str>>(track: Track, keywords: &[(S, u32)]) -> Result<Self> {
        let entries = keywords
            .iter()
            .map(|(keyword, weight)| {
                let keyword = keyword.as_ref().to_lowercase();
                let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&keyword)))
                    .map_err(|e| {
                        AbstrakError::invalid_argument(format!(
                            "Keyword {keyword:?} is not matchable: {e}"
                        ))
                    })?;
                Ok(WeightedKeyword {
                    keyword,
                    weight: *weight,
                    pattern,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { track, entries })
    }

    /// The built-in table for a track.
    pub fn builtin(track: Track) -> Arc<KeywordDictionary> {
        match track {
            Track::Rpl => Arc::clone(&RPL_DICTIONARY),
            Track::Tkj => Arc::clone(&TKJ_DICTIONARY),
        }
    }

    pub fn track(&self) -> Track {
        self.track
    }

    pub fn entries(&self) -> &[WeightedKeyword] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
