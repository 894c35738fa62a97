use clap::Parser;

#[derive(Parser)]
#[command(name = "askdoc")]
#[command(version = "0.1.0")]
#[command(about = "Terminal chat client for a document question-answering backend")]
pub struct Args {
    /// One-shot question; omit to start the interactive session
    pub question: Option<String>,

    /// Base URL of the Q&A backend
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub backend: String,

    /// Document to query (sent as the selected_file form field)
    #[arg(long, short)]
    pub file: Option<String>,

    /// Answer language (sent as the selected_language form field)
    #[arg(long, short)]
    pub language: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. askdoc=debug)
    #[arg(long, default_value = "askdoc=warn")]
    pub log: String,
}

/// Strip trailing slashes so endpoint paths join cleanly.
pub fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
