//! settle-runner: headless rider settlement runner.
//!
//! Usage:
//!   settle-runner --file riders.xlsx [--config settle.json] [--commission 100] [--export-dir out]
//!   settle-runner --ipc-mode [--config settle.json]

use anyhow::Result;
use rider_settle_core::{
    command::OperatorCommand,
    config::SettleConfig,
    controller::SettlementController,
    event::SettlementEvent,
    export::{resolve_destination, ExportTally, SummaryExporter},
    format::Formatter,
    ledger::RiderRecord,
    snapshot::LedgerSnapshot,
    source::XlsxSource,
    types::RecordIndex,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::atomic::AtomicBool;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Load {
        path: String,
    },
    GetState,
    GetRecord {
        index: RecordIndex,
    },
    Command {
        #[serde(flatten)]
        command: OperatorCommand,
    },
    ExportRecord {
        index: RecordIndex,
        dir:   Option<String>,
    },
    ExportAll {
        dir: Option<String>,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct RecordView<'a> {
    index:   RecordIndex,
    record:  &'a RiderRecord,
    summary: String,
}

struct Session {
    config:     SettleConfig,
    controller: SettlementController,
    exporter:   SummaryExporter,
}

impl Session {
    fn new(config: SettleConfig) -> Self {
        let exporter = SummaryExporter::new(Formatter::new(config.format.clone()), &config.export);
        Self {
            config,
            controller: SettlementController::new(),
            exporter,
        }
    }

    fn load(&mut self, path: &str) -> Result<SettlementEvent> {
        let mut source = XlsxSource::open(path, self.config.layout.clone())?;
        Ok(self.controller.load_from(&mut source)?)
    }

    fn export_all(&self, dir: Option<&str>) -> Result<ExportTally> {
        let mut sink = resolve_destination(dir.map(Path::new), &self.config.export)?;
        let never = AtomicBool::new(false);
        Ok(self.exporter.export_all(self.controller.records(), &mut sink, &never))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config = match arg_value(&args, "--config") {
        Some(path) => SettleConfig::load(path)?,
        None => SettleConfig::default(),
    };
    let mut session = Session::new(config);

    if ipc_mode {
        return run_ipc_loop(&mut session);
    }

    let file = arg_value(&args, "--file")
        .ok_or_else(|| anyhow::anyhow!("--file <xlsx> is required outside --ipc-mode"))?;
    session.load(file)?;
    println!("Loaded {} riders from {file}", session.controller.records().len());

    if let Some(rate) = arg_value(&args, "--commission") {
        match session.controller.apply_bulk_commission(rate) {
            Some(updated) => println!("Commission rate {rate} applied to {updated} riders"),
            None => println!("Commission rate {rate:?} ignored (not a number)"),
        }
    }

    print_summary(&session);

    if let Some(dir) = arg_value(&args, "--export-dir") {
        let tally = session.export_all(Some(dir))?;
        if tally.is_complete(session.controller.records().len()) {
            println!("All {} summaries saved", tally.succeeded);
        } else {
            println!("{} saved, {} failed", tally.succeeded, tally.failed);
        }
    }

    Ok(())
}

fn run_ipc_loop(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        match handle_ipc(session, cmd) {
            Ok(response) => writeln!(stdout, "{response}")?,
            Err(e) => {
                log::warn!("ipc: {e}");
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_ipc(session: &mut Session, cmd: IpcCommand) -> Result<serde_json::Value> {
    let response = match cmd {
        IpcCommand::Load { path } => {
            let event = session.load(&path)?;
            serde_json::to_value(event)?
        }
        IpcCommand::GetState => {
            serde_json::to_value(LedgerSnapshot::capture(session.controller.ledger()))?
        }
        IpcCommand::GetRecord { index } => {
            let record = session.controller.record(index).ok_or_else(|| {
                anyhow::anyhow!("record {index} does not exist")
            })?;
            serde_json::to_value(RecordView {
                index,
                record,
                summary: session.exporter.render(record),
            })?
        }
        IpcCommand::Command { command } => {
            let event = session.controller.apply(command)?;
            serde_json::to_value(event)?
        }
        IpcCommand::ExportRecord { index, dir } => {
            let mut sink = resolve_destination(dir.as_deref().map(Path::new), &session.config.export)?;
            let path = session
                .exporter
                .export_record(session.controller.records(), index, &mut sink)?;
            serde_json::json!({ "saved": path.display().to_string() })
        }
        IpcCommand::ExportAll { dir } => serde_json::to_value(session.export_all(dir.as_deref())?)?,
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(response)
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(session: &Session) {
    let fmt = Formatter::new(session.config.format.clone());
    let ledger = session.controller.ledger();
    let totals = ledger.totals();

    println!();
    println!("=== SETTLEMENT SUMMARY ===");
    println!(
        "  {:<4} {:<12} {:<12} {:>8} {:>14} {:>14} {:>12} {:>14}",
        "#", "ID", "Name", "Count", "Total fee", "Settlement", "Tax", "Final"
    );
    for (i, r) in ledger.records().iter().enumerate() {
        println!(
            "  {:<4} {:<12} {:<12} {:>8} {:>14} {:>14} {:>12} {:>14}",
            i,
            r.rider_id(),
            r.name(),
            r.process_count(),
            fmt.number(r.total_delivery_fee()),
            fmt.number(r.settlement_amount()),
            fmt.number(r.withholding_tax()),
            fmt.number(r.final_payment()),
        );
    }
    println!();
    println!("  riders:         {}", ledger.len());
    println!("  deliveries:     {}", fmt.count(totals.process_count));
    println!("  total fee:      {}", fmt.currency(totals.total_delivery_fee));
    println!("  withholding:    {}", fmt.currency(totals.withholding_tax));
    println!("  final payments: {}", fmt.currency(totals.final_payment));
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
