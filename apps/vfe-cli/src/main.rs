use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use vfe_app::{AppResult, DriverConfig, TablePaths, build_graph, load_tables, table_fingerprint};
use vfe_core::{TableId, VarIdx};
use vfe_graph::{Variable, VfeGraph, dependency_dot};
use vfe_pmu::VfeSetPayload;
use vfe_table::encode::{
    EquEntry, FieldTableEncoder, FuseDesc, RegEntryDesc, VarEntry, VfeTableEncoder,
};
use vfe_table::layout::{equ, var};
use vfe_table::{TableLocator, VfeHeader};

#[derive(Parser)]
#[command(name = "vfe-cli")]
#[command(about = "VFE CLI - inspect GPU voltage/frequency equation tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TableArgs {
    /// Path to the VFE table image
    vfe: PathBuf,
    /// Path to the VFE field table image
    #[arg(long)]
    field: Option<PathBuf>,
    /// Path to the VFE field register table image
    #[arg(long)]
    field_reg: Option<PathBuf>,
    /// Driver configuration YAML (overrides, strict fuse ids)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TableArgs {
    fn paths(&self) -> TablePaths {
        TablePaths {
            vfe: self.vfe.clone(),
            field: self.field.clone(),
            field_register: self.field_reg.clone(),
        }
    }

    fn config(&self) -> AppResult<DriverConfig> {
        match &self.config {
            Some(path) => DriverConfig::load_yaml(path),
            None => Ok(DriverConfig::default()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode tables and list variables and equations
    Decode {
        #[command(flatten)]
        tables: TableArgs,
        /// Print the coprocessor construct payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show dependency masks, or the invalidation set of one variable
    Deps {
        #[command(flatten)]
        tables: TableArgs,
        /// Variable whose change to trace
        #[arg(long)]
        var: Option<u8>,
    },
    /// Export the variable dependency graph in Graphviz DOT format
    Dot {
        #[command(flatten)]
        tables: TableArgs,
        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a small set of sample table images
    Sample {
        /// Output directory
        out_dir: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { tables, json } => cmd_decode(&tables, json),
        Commands::Deps { tables, var } => cmd_deps(&tables, var),
        Commands::Dot { tables, output } => cmd_dot(&tables, output.as_deref()),
        Commands::Sample { out_dir } => cmd_sample(&out_dir),
    }
}

fn load(args: &TableArgs) -> AppResult<(VfeHeader, VfeGraph, String)> {
    debug!(vfe = %args.vfe.display(), "loading VFE tables");
    let tables = load_tables(&args.paths())?;
    let config = args.config()?;
    let (header, graph) = build_graph(&tables, &config)?;
    let fingerprint = tables
        .locate_table(TableId::Vfe)
        .map(table_fingerprint)
        .unwrap_or_default();
    Ok((header, graph, fingerprint))
}

fn describe(var: &Variable) -> String {
    format!("{:?} range [{}, {}]", var.kind, var.output_range.min, var.output_range.max)
}

fn cmd_decode(args: &TableArgs, json: bool) -> AppResult<()> {
    let (header, graph, fingerprint) = load(args)?;

    if json {
        let payload = VfeSetPayload::from_graph(&graph);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("VFE table {:#04x} (sha256 {})", header.version.code(), fingerprint);
    println!("  Polling period: {} ms", header.polling_period_ms);
    println!(
        "  Variables: {} of {} slots",
        graph.variables().len(),
        header.var_entry_count
    );
    for (i, var) in graph.variables().iter() {
        println!("    [{:3}] {}", i, describe(var));
    }
    println!(
        "  Equations: {} of {} slots",
        graph.equations().len(),
        header.equ_entry_count
    );
    for (i, equ) in graph.equations().iter() {
        let operand = equ
            .operand_var
            .map_or_else(|| "-".to_string(), |v| v.to_string());
        let next = equ.next.map_or_else(|| "-".to_string(), |e| e.to_string());
        println!(
            "    [{:4}] {:?} var {} next {} unit {}",
            i,
            equ.kind,
            operand,
            next,
            equ.output_unit
        );
    }
    Ok(())
}

fn cmd_deps(args: &TableArgs, var: Option<u8>) -> AppResult<()> {
    let (_header, graph, _) = load(args)?;

    if let Some(v) = var {
        let (vars, equs) = graph.invalidation_set(VarIdx::from(v));
        println!("Changing variable {} invalidates:", v);
        println!("  variables: {:?}", vars);
        println!("  equations: {:?}", equs);
        return Ok(());
    }

    for (i, var) in graph.variables().iter() {
        let dynamic = match var.is_dynamic() {
            Some(true) => "dynamic",
            Some(false) => "static",
            None => "unknown",
        };
        println!("[{:3}] {:?} ({})", i, var.var_type(), dynamic);
        println!("      depends on:     {:?}", var.depends_on());
        println!("      depended on by: {:?}", var.depended_on_by());
        println!("      equations:      {:?}", var.dependent_equations());
    }
    Ok(())
}

fn cmd_dot(args: &TableArgs, output: Option<&Path>) -> AppResult<()> {
    let (_header, graph, _) = load(args)?;
    let dot = dependency_dot(&graph);
    match output {
        Some(path) => {
            std::fs::write(path, dot)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", dot),
    }
    Ok(())
}

fn cmd_sample(out_dir: &Path) -> AppResult<()> {
    std::fs::create_dir_all(out_dir)?;

    let mut fields = FieldTableEncoder::new();
    let reg = fields.register(RegEntryDesc::Register { addr: 0x0002_1100 });
    fields.segment(0x1E, reg, 0, 15).segment(0x1F, reg, 16, 19);
    let (field_bytes, reg_bytes) = fields.finish();

    let mut enc = VfeTableEncoder::v30(0x19, 0x18).polling_period_ms(100);
    enc.var(VarEntry::temperature(2, 3200, -1600, 0))
        .var(VarEntry::frequency(0))
        .var(VarEntry::sum(0, 1))
        .var(VarEntry::fuse(
            var::TYPE_SINGLE_SENSED_FUSE,
            FuseDesc {
                id: 0x1E,
                id_version: 0x1F,
                expected_version: 2,
                check_version: true,
                use_default_on_fail: true,
                ..FuseDesc::default()
            },
        ))
        .var(VarEntry::product(2, 3))
        .equ(EquEntry::new(equ::TYPE_QUADRATIC, Some(2), Some(1)).output_type(2))
        .equ(EquEntry::new(equ::TYPE_QUADRATIC, Some(4), None).output_type(2));

    for (name, bytes) in [
        ("vfe.bin", enc.finish()),
        ("field.bin", field_bytes),
        ("field_reg.bin", reg_bytes),
    ] {
        let path = out_dir.join(name);
        std::fs::write(&path, bytes)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
