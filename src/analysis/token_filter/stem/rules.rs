//! Affix tables for the Indonesian stemmer.
//!
//! Suffixes are stripped in three layers (particle, possessive pronoun,
//! derivational suffix). Prefixes are stripped either plainly (`di-`, `ke-`,
//! `se-`) or through the numbered disambiguation rules, which decide how the
//! nasal or `r` of a prefix fused with the first letter of the root. Each rule
//! may offer several candidate roots; the stemmer keeps the first candidate
//! found in the root dictionary, otherwise the last candidate produced.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Whether an affix came off the front or the back of a word, and which layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AffixKind {
    /// `-lah`, `-kah`, `-tah`, `-pun`
    Particle,
    /// `-ku`, `-mu`, `-nya`
    Possessive,
    /// `-i`, `-kan`, `-an`, `-is`, `-isme`, `-isasi`
    DerivationalSuffix,
    /// Any prefix.
    Prefix,
}

impl AffixKind {
    pub fn is_suffix(self) -> bool {
        !matches!(self, AffixKind::Prefix)
    }
}

/// A suffix layer: one anchored pattern whose match is cut off.
pub struct SuffixRule {
    pub kind: AffixKind,
    pattern: Regex,
}

impl SuffixRule {
    fn new(kind: AffixKind, pattern: &str) -> Self {
        SuffixRule {
            kind,
            pattern: compile(pattern),
        }
    }

    /// Strip the suffix, returning the remaining word when something was cut.
    pub fn strip(&self, word: &str) -> Option<String> {
        let stripped = self.pattern.replace(word, "");
        (stripped.len() < word.len()).then(|| stripped.into_owned())
    }
}

/// Maps the captures of a prefix pattern to a candidate root.
type Rewrite = fn(&Captures<'_>) -> Option<String>;

struct Variant {
    pattern: Regex,
    rewrite: Rewrite,
}

/// A numbered prefix disambiguation rule.
pub struct PrefixRule {
    pub id: &'static str,
    variants: Vec<Variant>,
}

impl fmt::Debug for PrefixRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixRule")
            .field("id", &self.id)
            .field("variants", &self.variants.len())
            .finish()
    }
}

impl PrefixRule {
    fn new(id: &'static str, variants: &[(&str, Rewrite)]) -> Self {
        PrefixRule {
            id,
            variants: variants
                .iter()
                .map(|&(pattern, rewrite)| Variant {
                    pattern: compile(pattern),
                    rewrite,
                })
                .collect(),
        }
    }

    /// Candidate roots in variant order. Variants that do not apply yield `None`.
    pub fn candidates<'a>(&'a self, word: &'a str) -> impl Iterator<Item = Option<String>> + 'a {
        self.variants.iter().map(move |variant| {
            variant
                .pattern
                .captures(word)
                .and_then(|caps| (variant.rewrite)(&caps))
        })
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("affix patterns are valid regexes")
}

fn g<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn join(parts: &[&str]) -> Option<String> {
    Some(parts.concat())
}

/// Suffix layers in stripping order.
pub static SUFFIX_RULES: LazyLock<Vec<SuffixRule>> = LazyLock::new(|| {
    vec![
        SuffixRule::new(AffixKind::Particle, r"-*([klt]ah|pun)$"),
        SuffixRule::new(AffixKind::Possessive, r"-*(ku|mu|nya)$"),
        SuffixRule::new(AffixKind::DerivationalSuffix, r"(is|isme|isasi|i|kan|an)$"),
    ]
});

/// Plain prefixes removed without disambiguation.
pub static PLAIN_PREFIX: LazyLock<Regex> = LazyLock::new(|| compile(r"^(di|ke|se)"));

/// Words whose confix is resolved prefix-first.
pub static PRECEDENCE_ADJUSTMENT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^be(.*)lah$",
        r"^be(.*)an$",
        r"^me(.*)i$",
        r"^di(.*)i$",
        r"^pe(.*)i$",
        r"^ter(.*)i$",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

/// Prefix disambiguation rules in evaluation order.
pub static PREFIX_RULES: LazyLock<Vec<PrefixRule>> = LazyLock::new(|| {
    vec![
        PrefixRule::new(
            "1",
            &[
                (r"^ber([aiueo].*)$", |c| join(&[g(c, 1)])),
                (r"^ber([aiueo].*)$", |c| join(&["r", g(c, 1)])),
            ],
        ),
        PrefixRule::new(
            "2",
            &[(r"^ber([bcdfghjklmnpqrstvwxyz])([a-z])(.*)$", |c| {
                if g(c, 1) == "r" || g(c, 3).starts_with("er") {
                    return None;
                }
                join(&[g(c, 1), g(c, 2), g(c, 3)])
            })],
        ),
        PrefixRule::new(
            "3",
            &[(r"^ber([bcdfghjklmnpqrstvwxyz])([a-z])er([aiueo])(.*)$", |c| {
                if g(c, 1) == "r" {
                    return None;
                }
                join(&[g(c, 1), g(c, 2), "er", g(c, 3), g(c, 4)])
            })],
        ),
        PrefixRule::new("4", &[(r"^belajar$", |_| join(&["ajar"]))]),
        PrefixRule::new(
            "5",
            &[(r"^be([bcdfghjklmnpqrstvwxyz])er([bcdfghjklmnpqrstvwxyz])(.*)$", |c| {
                if g(c, 1) == "r" {
                    return None;
                }
                join(&[g(c, 1), "er", g(c, 2), g(c, 3)])
            })],
        ),
        PrefixRule::new(
            "6",
            &[
                (r"^ter([aiueo].*)$", |c| join(&[g(c, 1)])),
                (r"^ter([aiueo].*)$", |c| join(&["r", g(c, 1)])),
            ],
        ),
        PrefixRule::new(
            "7",
            &[(r"^ter([bcdfghjklmnpqrstvwxyz])er([aiueo].*)$", |c| {
                if g(c, 1) == "r" {
                    return None;
                }
                join(&[g(c, 1), "er", g(c, 2)])
            })],
        ),
        PrefixRule::new(
            "8",
            &[(r"^ter([bcdfghjklmnpqrstvwxyz])(.*)$", |c| {
                if g(c, 1) == "r" || g(c, 2).starts_with("er") {
                    return None;
                }
                join(&[g(c, 1), g(c, 2)])
            })],
        ),
        PrefixRule::new(
            "9",
            &[(r"^te([bcdfghjklmnpqrstvwxyz])er([bcdfghjklmnpqrstvwxyz])(.*)$", |c| {
                if g(c, 1) == "r" {
                    return None;
                }
                join(&[g(c, 1), "er", g(c, 2), g(c, 3)])
            })],
        ),
        PrefixRule::new(
            "10",
            &[(r"^me([lrwy])([aiueo])(.*)$", |c| {
                join(&[g(c, 1), g(c, 2), g(c, 3)])
            })],
        ),
        PrefixRule::new("11", &[(r"^mem([bfv])(.*)$", |c| join(&[g(c, 1), g(c, 2)]))]),
        PrefixRule::new("12", &[(r"^mempe(.*)$", |c| join(&["pe", g(c, 1)]))]),
        PrefixRule::new(
            "13",
            &[
                (r"^mem([aiueo])(.*)$", |c| join(&["m", g(c, 1), g(c, 2)])),
                (r"^mem([aiueo])(.*)$", |c| join(&["p", g(c, 1), g(c, 2)])),
            ],
        ),
        PrefixRule::new("14", &[(r"^men([cdjstz])(.*)$", |c| join(&[g(c, 1), g(c, 2)]))]),
        PrefixRule::new(
            "15",
            &[
                (r"^men([aiueo])(.*)$", |c| join(&["n", g(c, 1), g(c, 2)])),
                (r"^men([aiueo])(.*)$", |c| join(&["t", g(c, 1), g(c, 2)])),
            ],
        ),
        PrefixRule::new("16", &[(r"^meng([ghqk])(.*)$", |c| join(&[g(c, 1), g(c, 2)]))]),
        PrefixRule::new(
            "17",
            &[
                (r"^meng([aiueo])(.*)$", |c| join(&[g(c, 1), g(c, 2)])),
                (r"^meng([aiueo])(.*)$", |c| join(&["k", g(c, 1), g(c, 2)])),
                (r"^menge(.*)$", |c| join(&[g(c, 1)])),
                (r"^meng([aiueo])(.*)$", |c| join(&["ng", g(c, 1), g(c, 2)])),
            ],
        ),
        PrefixRule::new(
            "18",
            &[
                (r"^meny([aiueo])(.*)$", |c| join(&["ny", g(c, 1), g(c, 2)])),
                (r"^meny([aiueo])(.*)$", |c| join(&["s", g(c, 1), g(c, 2)])),
            ],
        ),
        PrefixRule::new(
            "19",
            &[(r"^memp([abcdfghijklmopqrstuvwxyz])(.*)$", |c| {
                join(&["p", g(c, 1), g(c, 2)])
            })],
        ),
        PrefixRule::new(
            "20",
            &[(r"^pe([wy])([aiueo])(.*)$", |c| join(&[g(c, 1), g(c, 2), g(c, 3)]))],
        ),
        PrefixRule::new(
            "21",
            &[
                (r"^per([aiueo])(.*)$", |c| join(&[g(c, 1), g(c, 2)])),
                (r"^per([aiueo])(.*)$", |c| join(&["r", g(c, 1), g(c, 2)])),
            ],
        ),
        PrefixRule::new(
            "23",
            &[(r"^per([bcdfghjklmnpqrstvwxyz])([a-z])(.*)$", |c| {
                if g(c, 1) == "r" || g(c, 3).starts_with("er") {
                    return None;
                }
                join(&[g(c, 1), g(c, 2), g(c, 3)])
            })],
        ),
        PrefixRule::new(
            "24",
            &[(r"^per([bcdfghjklmnpqrstvwxyz])([a-z])er([aiueo])(.*)$", |c| {
                if g(c, 1) == "r" {
                    return None;
                }
                join(&[g(c, 1), g(c, 2), "er", g(c, 3), g(c, 4)])
            })],
        ),
        PrefixRule::new("25", &[(r"^pem([bfv])(.*)$", |c| join(&[g(c, 1), g(c, 2)]))]),
        PrefixRule::new(
            "26",
            &[
                (r"^pem([aiueo])(.*)$", |c| join(&["m", g(c, 1), g(c, 2)])),
                (r"^pem([aiueo])(.*)$", |c| join(&["p", g(c, 1), g(c, 2)])),
            ],
        ),
        PrefixRule::new("27", &[(r"^pen([cdjstz])(.*)$", |c| join(&[g(c, 1), g(c, 2)]))]),
        PrefixRule::new(
            "28",
            &[
                (r"^pen([aiueo])(.*)$", |c| join(&["n", g(c, 1), g(c, 2)])),
                (r"^pen([aiueo])(.*)$", |c| join(&["t", g(c, 1), g(c, 2)])),
            ],
        ),
        PrefixRule::new(
            "29",
            &[(r"^peng([bcdfghjklmnpqrstvwxyz])(.*)$", |c| {
                join(&[g(c, 1), g(c, 2)])
            })],
        ),
        PrefixRule::new(
            "30",
            &[
                (r"^peng([aiueo])(.*)$", |c| join(&[g(c, 1), g(c, 2)])),
                (r"^peng([aiueo])(.*)$", |c| join(&["k", g(c, 1), g(c, 2)])),
                (r"^penge(.*)$", |c| join(&[g(c, 1)])),
            ],
        ),
        PrefixRule::new(
            "31",
            &[
                (r"^peny([aiueo])(.*)$", |c| join(&["ny", g(c, 1), g(c, 2)])),
                (r"^peny([aiueo])(.*)$", |c| join(&["s", g(c, 1), g(c, 2)])),
            ],
        ),
        PrefixRule::new(
            "32",
            &[(r"^pe(l[aiueo])(.*)$", |c| {
                if g(c, 0) == "pelajar" {
                    return join(&["ajar"]);
                }
                join(&[g(c, 1), g(c, 2)])
            })],
        ),
        PrefixRule::new(
            "33",
            &[(r"^pe([bcdfghjklmnpqrstvwxyz])er([aiueo])(.*)$", |c| {
                if "rwylmn".contains(g(c, 1)) {
                    return None;
                }
                join(&[g(c, 1), "er", g(c, 2), g(c, 3)])
            })],
        ),
        PrefixRule::new(
            "34",
            &[(r"^pe([bcdfghjklmnpqrstvwxyz])(.*)$", |c| {
                if "rwylmn".contains(g(c, 1)) || g(c, 2).starts_with("er") {
                    return None;
                }
                join(&[g(c, 1), g(c, 2)])
            })],
        ),
        PrefixRule::new(
            "35",
            &[(r"^ter([bcdfghjkpqstvxz])(er[bcdfghjklmnpqrstvwxyz])(.*)$", |c| {
                join(&[g(c, 1), g(c, 2), g(c, 3)])
            })],
        ),
        PrefixRule::new(
            "36",
            &[(r"^pe([bcdfghjkpqstvxz])(er[bcdfghjklmnpqrstvwxyz])(.*)$", |c| {
                join(&[g(c, 1), g(c, 2), g(c, 3)])
            })],
        ),
        PrefixRule::new("41", &[(r"^ku(.*)$", |c| join(&[g(c, 1)]))]),
        PrefixRule::new("42", &[(r"^kau(.*)$", |c| join(&[g(c, 1)]))]),
    ]
});

/// Whether a word's confix should be stripped prefix-first.
pub fn needs_precedence_adjustment(word: &str) -> bool {
    PRECEDENCE_ADJUSTMENT.iter().any(|re| re.is_match(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> &'static PrefixRule {
        PREFIX_RULES.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn test_suffix_layers() {
        assert_eq!(SUFFIX_RULES[0].strip("bukanlah").as_deref(), Some("bukan"));
        assert_eq!(SUFFIX_RULES[1].strip("bukunya").as_deref(), Some("buku"));
        assert_eq!(SUFFIX_RULES[2].strip("jaringan").as_deref(), Some("jaring"));
        assert_eq!(SUFFIX_RULES[2].strip("normalisasi").as_deref(), Some("normal"));
        assert_eq!(SUFFIX_RULES[2].strip("sistem"), None);
    }

    #[test]
    fn test_nasal_rules_offer_candidates_in_order() {
        let candidates: Vec<_> = rule("15").candidates("menulis").collect();
        assert_eq!(
            candidates,
            vec![Some("nulis".to_string()), Some("tulis".to_string())]
        );

        let candidates: Vec<_> = rule("17").candidates("mengembang").collect();
        assert_eq!(candidates[1].as_deref(), Some("kembang"));
    }

    #[test]
    fn test_rule_constraints() {
        // berC1AP with P starting with "er" belongs to rule 3
        assert_eq!(rule("2").candidates("berkaerat").next(), Some(None));
        assert_eq!(
            rule("2").candidates("berbasis").next(),
            Some(Some("basis".to_string()))
        );
        assert_eq!(
            rule("32").candidates("pelajar").next(),
            Some(Some("ajar".to_string()))
        );
    }

    #[test]
    fn test_precedence_adjustment() {
        assert!(needs_precedence_adjustment("bermainlah"));
        assert!(!needs_precedence_adjustment("pelaksanaan"));
        assert!(needs_precedence_adjustment("mengetahui"));
    }
}
