//! Command-line and environment configuration.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cursor::DEFAULT_MAX_SESSIONS;
use crate::roster::RangeOrdering;

/// Student portal: look up student records from a spreadsheet.
#[derive(Debug, Clone, Parser)]
#[command(name = "student-portal", version, about)]
pub struct Config {
    /// Student table (CSV or Excel workbook)
    #[arg(long, env = "PORTAL_DATA", default_value = "students.xlsx")]
    pub data: PathBuf,

    /// Address to listen on
    #[arg(long, env = "PORTAL_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Directory the file browser is confined to
    #[arg(long, env = "PORTAL_BROWSE_ROOT", default_value = ".")]
    pub browse_root: PathBuf,

    /// Directory served under /static (photos live in <dir>/photos)
    #[arg(long, env = "PORTAL_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// How range searches compare roll numbers
    #[arg(long, env = "PORTAL_RANGE_COMPARE", value_enum, default_value_t = RangeOrdering::Lexical)]
    pub range_compare: RangeOrdering,

    /// Seconds a browsing session stays alive
    #[arg(long, env = "PORTAL_SESSION_TTL_SECS", default_value_t = 24 * 60 * 60)]
    pub session_ttl_secs: u64,

    /// Upper bound on live sessions; the oldest is evicted when full
    #[arg(long, env = "PORTAL_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,
}

impl Config {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
