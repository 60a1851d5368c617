#![allow(dead_code)]

use std::path::Path;

use abstrak::config::ClassifierConfig;
use abstrak::ml::VectorizerConfig;
use abstrak::track::Track;

pub const TKJ_ABSTRACTS: &[&str] = &[
    "Penelitian ini merancang jaringan komputer sekolah menggunakan router Mikrotik dengan manajemen bandwidth.",
    "Analisis quality of service jaringan wireless kampus dengan parameter throughput, delay dan packet loss.",
    "Implementasi VPN pada jaringan kantor untuk keamanan komunikasi data antar cabang.",
    "Perancangan topologi jaringan dan konfigurasi VLAN menggunakan switch Cisco.",
    "Monitoring trafik jaringan dan server menggunakan SNMP dan router Mikrotik.",
    "Implementasi firewall dan proxy server untuk keamanan jaringan warnet.",
    "Optimasi bandwidth hotspot jaringan wireless dengan router Mikrotik di desa.",
    "Perancangan jaringan komputer berbasis OSPF untuk routing dinamis antar gedung.",
];

pub const RPL_ABSTRACTS: &[&str] = &[
    "Pengembangan aplikasi sistem informasi perpustakaan berbasis web menggunakan framework Laravel dan database MySQL.",
    "Rancang bangun aplikasi android untuk pemesanan makanan dengan metode waterfall.",
    "Sistem informasi akademik berbasis web dengan pengujian black box dan basis data MySQL.",
    "Aplikasi pengelolaan inventaris barang berbasis web menggunakan metode prototype.",
    "Pengembangan sistem informasi penjualan dengan diagram UML dan pengujian sistem.",
    "Aplikasi e-learning berbasis web untuk sekolah menengah dengan framework CodeIgniter.",
    "Sistem pendukung keputusan pemilihan karyawan berbasis web dengan database.",
    "Aplikasi mobile pencatatan keuangan menggunakan Flutter dan REST API.",
];

/// Interleaved labeled corpus, TKJ first.
pub fn corpus() -> (Vec<String>, Vec<Track>) {
    let mut texts = Vec::new();
    let mut labels = Vec::new();
    for (tkj, rpl) in TKJ_ABSTRACTS.iter().zip(RPL_ABSTRACTS) {
        texts.push(tkj.to_string());
        labels.push(Track::Tkj);
        texts.push(rpl.to_string());
        labels.push(Track::Rpl);
    }
    (texts, labels)
}

pub fn config(dir: &Path) -> ClassifierConfig {
    ClassifierConfig {
        k: 3,
        vectorizer: VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        },
        model_dir: dir.join("model"),
        ..ClassifierConfig::default()
    }
}
