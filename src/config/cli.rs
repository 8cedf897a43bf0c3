use crate::core::viewer::PAGE_SIZE_OPTIONS;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "awms")]
#[command(about = "Offline workbook store: upload spreadsheets, browse and export them")]
pub struct CliConfig {
    /// TOML 設定檔
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 覆寫 store.path
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// 覆寫 server.base_url
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse a workbook and store it locally
    Ingest {
        file: PathBuf,
        /// Also upload the original file to the server
        #[arg(long)]
        sync: bool,
        /// Upload endpoint (defaults to /upload)
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// List stored files
    List,
    /// Show one page of a stored file
    Show {
        id: i64,
        #[arg(long)]
        sheet: Option<String>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value = "1")]
        page: usize,
        /// Rows per page: 10, 20, 50 or 100
        #[arg(long, value_parser = parse_page_size)]
        page_size: Option<usize>,
    },
    /// Export the filtered rows of one sheet as CSV
    ExportCsv {
        id: i64,
        #[arg(long)]
        sheet: Option<String>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export every stored original file into one ZIP archive
    ExportAll {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a stored original file back to disk
    Download {
        id: i64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete a stored file
    Delete { id: i64 },
    /// Remove every stored file
    Clear,
    /// Probe the server health endpoint once
    Health,
    /// Keep probing the server and report online/offline changes
    Watch,
}

fn parse_page_size(value: &str) -> Result<usize, String> {
    let size: usize = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if PAGE_SIZE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {:?}", PAGE_SIZE_OPTIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingest_with_sync() {
        let cli = CliConfig::parse_from([
            "awms", "--db", "x.db", "ingest", "staff.xlsx", "--sync", "--endpoint", "",
        ]);
        assert_eq!(cli.db.as_deref(), Some("x.db"));
        match cli.command {
            Command::Ingest { file, sync, endpoint } => {
                assert_eq!(file, PathBuf::from("staff.xlsx"));
                assert!(sync);
                assert_eq!(endpoint.as_deref(), Some(""));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_show_defaults() {
        let cli = CliConfig::parse_from(["awms", "show", "3", "--filter", "night"]);
        match cli.command {
            Command::Show { id, page, filter, .. } => {
                assert_eq!(id, 3);
                assert_eq!(page, 1);
                assert_eq!(filter.as_deref(), Some("night"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_page_size_limited_to_offered_options() {
        let cli = CliConfig::parse_from(["awms", "show", "3", "--page-size", "50"]);
        match cli.command {
            Command::Show { page_size, .. } => assert_eq!(page_size, Some(50)),
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(CliConfig::try_parse_from(["awms", "show", "3", "--page-size", "15"]).is_err());
        assert!(CliConfig::try_parse_from(["awms", "show", "3", "--page-size", "ten"]).is_err());
    }
}
