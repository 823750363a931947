use clap::Parser;
use std::path::PathBuf;

use crate::server::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "zipbrowse")]
#[command(version)]
#[command(about = "Browse a directory tree over HTTP, descending into ZIP archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipbrowse --base-path /data                      serve /data on 127.0.0.1:8080\n  \
  zipbrowse --base-path /data --context-path /artifacts --listen 0.0.0.0:80\n  \
  zipbrowse --base-path /data --reserved listing.xsl   hide listing.xsl from listings")]
pub struct Cli {
    /// Root directory of the browsable hierarchy
    #[arg(long, value_name = "DIR")]
    pub base_path: PathBuf,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8080")]
    pub listen: String,

    /// URL prefix under which requests are accepted
    #[arg(long, value_name = "PATH", default_value = "")]
    pub context_path: String,

    /// Extra names hidden from listings (repeatable)
    #[arg(long = "reserved", value_name = "NAME")]
    pub reserved: Vec<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            base_path: self.base_path.clone(),
            context_path: self.context_path.clone(),
            reserved_names: self.reserved.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["zipbrowse", "--base-path", "/data"]).unwrap();
        assert_eq!(cli.base_path, PathBuf::from("/data"));
        assert_eq!(cli.listen, "127.0.0.1:8080");
        assert_eq!(cli.context_path, "");
        assert!(cli.reserved.is_empty());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn repeated_reserved_names() {
        let cli = Cli::try_parse_from([
            "zipbrowse",
            "--base-path",
            "/data",
            "--context-path",
            "/artifacts",
            "--reserved",
            "a.xsl",
            "--reserved",
            "b.xsl",
        ])
        .unwrap();
        let config = cli.server_config();
        assert_eq!(config.context_path, "/artifacts");
        assert_eq!(config.reserved_names, ["a.xsl", "b.xsl"]);
    }

    #[test]
    fn base_path_is_required() {
        assert!(Cli::try_parse_from(["zipbrowse"]).is_err());
    }
}
