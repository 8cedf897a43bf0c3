use awms_offline::config::{load_config, Command};
use awms_offline::core::export::ARCHIVE_FILENAME;
use awms_offline::utils::error::{AwmsError, ErrorSeverity};
use awms_offline::utils::{logger, validation::Validate};
use awms_offline::{app, CliConfig, Connectivity, Workspace};
use chrono::{Local, TimeZone};
use clap::Parser;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match load_config(&cli).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_logger(cli.verbose, config.log_level(), config.log_format());
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli, config).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig, config: awms_offline::TomlConfig) -> Result<(), AwmsError> {
    match cli.command {
        Command::Health => {
            let monitor = app::connectivity_monitor(&config)?;
            match monitor.check().await {
                Connectivity::Online => println!("🌐 online ({})", monitor.health_url()),
                Connectivity::Offline => println!("📴 offline ({})", monitor.health_url()),
            }
            return Ok(());
        }
        Command::Watch => {
            let monitor = app::connectivity_monitor(&config)?;
            let handle = monitor.spawn(
                config.connectivity_initial_delay(),
                config.connectivity_interval(),
            );
            let mut rx = handle.subscribe();
            println!("Watching server connectivity, press Ctrl+C to stop");
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        match handle.current() {
                            Some(Connectivity::Online) => println!("🌐 online"),
                            Some(Connectivity::Offline) => println!("📴 offline"),
                            None => {}
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            handle.shutdown();
            return Ok(());
        }
        _ => {}
    }

    let workspace = Workspace::open(&config)?;
    let result = dispatch(&workspace, cli.command, config.page_size()).await;
    workspace.close().await?;
    result
}

async fn dispatch(
    workspace: &Workspace,
    command: Command,
    default_page_size: usize,
) -> Result<(), AwmsError> {
    let viewer = workspace.viewer();

    match command {
        Command::Ingest { file, .. } => {
            println!("Parsing file...");
            let report = workspace.ingest(&file).await?;
            let icon = if report.sync.is_failed() { "⚠️" } else { "✅" };
            println!("{} {}", icon, report.status_message());
        }
        Command::List => {
            let records = viewer.list_records().await?;
            if records.is_empty() {
                println!("No files stored locally.");
            }
            for record in records {
                let uploaded = Local
                    .timestamp_millis_opt(record.uploaded_at)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| record.uploaded_at.to_string());
                println!(
                    "#{:<4} {}  Uploaded: {} • Sheets: {} ({})",
                    record.id,
                    record.filename,
                    uploaded,
                    record.sheet_count,
                    record.sheet_names.join(", ")
                );
            }
        }
        Command::Show {
            id,
            sheet,
            filter,
            page,
            page_size,
        } => {
            let mut view = viewer.open_detail(id).await?;
            if let Some(sheet) = sheet {
                view.select_sheet_by_name(&sheet)?;
            }
            view.set_page_size(page_size.unwrap_or(default_page_size));
            if let Some(filter) = filter {
                view.set_filter(&filter);
            }
            view.go_to_page(page);
            print!("{}", view.render_page());
        }
        Command::ExportCsv {
            id,
            sheet,
            filter,
            out,
        } => {
            let mut view = viewer.open_detail(id).await?;
            if let Some(sheet) = sheet {
                view.select_sheet_by_name(&sheet)?;
            }
            if let Some(filter) = filter {
                view.set_filter(&filter);
            }
            let csv = view.export_csv()?;
            let out = out.unwrap_or_else(|| PathBuf::from(view.csv_filename()));
            tokio::fs::write(&out, csv).await?;
            println!("📁 {} row(s) exported to {}", view.filtered_count(), out.display());
        }
        Command::ExportAll { out } => {
            let archive = viewer.export_archive().await?;
            let out = out.unwrap_or_else(|| PathBuf::from(ARCHIVE_FILENAME));
            tokio::fs::write(&out, archive).await?;
            println!("📁 Archive saved to {}", out.display());
        }
        Command::Download { id, out } => {
            let (filename, bytes) = viewer.download(id).await?;
            let out = out.unwrap_or_else(|| PathBuf::from(&filename));
            tokio::fs::write(&out, bytes).await?;
            println!("📁 {} saved to {}", filename, out.display());
        }
        Command::Delete { id } => {
            viewer.delete_record(id).await?;
            println!("Deleted #{}", id);
        }
        Command::Clear => {
            use awms_offline::RecordStore;
            workspace.store().clear().await?;
            println!("Local store cleared");
        }
        Command::Health | Command::Watch => {}
    }

    Ok(())
}
