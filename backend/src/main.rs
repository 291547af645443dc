//! HNE Import CLI - product spreadsheet to WebToffee import CSV
//!
//! ```bash
//! hne-import sheets catalog.xlsx                      # List worksheets
//! hne-import columns catalog.xlsx --sheet Products    # Show candidate attribute columns
//! hne-import init-config catalog.xlsx -o import.json  # Write a starter config
//! hne-import convert catalog.xlsx -c import.json -o webtoffee_import.csv
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use hne_import::config::{BRAND_ENV, DEFAULT_BRAND, DEFAULT_OUTPUT_NAME};
use hne_import::{
    convert_file, inspect_file, sheet_names, AttributeDecision, ColumnRoles, ImportConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hne-import")]
#[command(about = "Generate WebToffee WooCommerce import files from product spreadsheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the worksheets of a workbook
    Sheets {
        /// Input workbook
        input: PathBuf,
    },

    /// Show candidate attribute columns and their values
    Columns {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        roles: RoleArgs,
    },

    /// Write a starter configuration listing every attribute column
    InitConfig {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        roles: RoleArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the import file
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        roles: RoleArgs,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Mark a column as a variation attribute (repeatable)
        #[arg(long = "variation", value_name = "COLUMN")]
        variations: Vec<String>,

        /// Show a column in the additional information tab (repeatable)
        #[arg(long = "visible", value_name = "COLUMN")]
        visible: Vec<String>,

        /// Do not use a column as an attribute (repeatable)
        #[arg(long = "skip", value_name = "COLUMN")]
        skipped: Vec<String>,

        /// Prefix parent titles with the brand
        #[arg(long)]
        brand_in_title: bool,

        /// Suffix variation titles with their SKU
        #[arg(long)]
        sku_in_title: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Input spreadsheet (.csv, .xlsx, ...)
    input: PathBuf,

    /// Worksheet to read (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,
}

#[derive(Args)]
struct RoleArgs {
    /// SKU column
    #[arg(long)]
    sku_column: Option<String>,

    /// Product name column
    #[arg(long)]
    product_column: Option<String>,

    /// Categories column
    #[arg(long)]
    category_column: Option<String>,

    /// Brand used in parent SKUs
    #[arg(short, long, env = BRAND_ENV)]
    brand: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sheets { input } => cmd_sheets(&input),

        Commands::Columns { source, roles } => cmd_columns(&source, &roles),

        Commands::InitConfig { source, roles, output } => {
            cmd_init_config(&source, &roles, output.as_deref())
        }

        Commands::Convert {
            source,
            roles,
            config,
            variations,
            visible,
            skipped,
            brand_in_title,
            sku_in_title,
            output,
            format,
        } => {
            let overrides = Overrides {
                variations,
                visible,
                skipped,
                brand_in_title,
                sku_in_title,
            };
            cmd_convert(&source, &roles, config.as_deref(), &overrides, output.as_deref(), format)
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Command-line adjustments applied on top of the config file.
struct Overrides {
    variations: Vec<String>,
    visible: Vec<String>,
    skipped: Vec<String>,
    brand_in_title: bool,
    sku_in_title: bool,
}

/// Load the config file (if any) and apply role flags over it.
fn build_config(roles: &RoleArgs, config_path: Option<&Path>) -> Result<ImportConfig, Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => ImportConfig::from_file(path)?,
        None => {
            let (sku, product, category) = match (&roles.sku_column, &roles.product_column, &roles.category_column) {
                (Some(s), Some(p), Some(c)) => (s.clone(), p.clone(), c.clone()),
                _ => {
                    return Err("--sku-column, --product-column and --category-column are required without --config".into())
                }
            };
            ImportConfig::new(ColumnRoles::new(sku, product, category), DEFAULT_BRAND)
        }
    };

    if let Some(ref sku) = roles.sku_column {
        config.columns.sku = sku.clone();
    }
    if let Some(ref product) = roles.product_column {
        config.columns.product = product.clone();
    }
    if let Some(ref category) = roles.category_column {
        config.columns.category = category.clone();
    }
    if let Some(ref brand) = roles.brand {
        config.brand = brand.clone();
    }

    Ok(config)
}

fn cmd_sheets(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    for name in sheet_names(input)? {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_columns(source: &SourceArgs, roles: &RoleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(roles, None)?;
    let candidates = inspect_file(&source.input, source.sheet.as_deref(), &config)?;

    if candidates.is_empty() {
        eprintln!("📋 No attribute columns found.");
        return Ok(());
    }

    for candidate in candidates {
        let (shown, hidden) = candidate.preview(5);
        println!("  📄 {}", candidate.name);
        println!("     Unique values ({}): {}", candidate.distinct_values.len(), shown.join(", "));
        if hidden > 0 {
            println!("     ... and {} more", hidden);
        }
    }
    Ok(())
}

fn cmd_init_config(
    source: &SourceArgs,
    roles: &RoleArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = build_config(roles, None)?;
    let candidates = inspect_file(&source.input, source.sheet.as_deref(), &config)?;

    for candidate in &candidates {
        config.attributes.insert(candidate.name.clone(), AttributeDecision::default());
    }

    write_output(config.to_json()?.as_bytes(), output)?;
    eprintln!("✅ {} attribute columns listed", candidates.len());
    Ok(())
}

fn cmd_convert(
    source: &SourceArgs,
    roles: &RoleArgs,
    config_path: Option<&Path>,
    overrides: &Overrides,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = build_config(roles, config_path)?;

    for column in &overrides.variations {
        config.decision_mut(column).is_variation = true;
    }
    for column in &overrides.visible {
        config.decision_mut(column).visible_info = true;
    }
    for column in &overrides.skipped {
        config.decision_mut(column).use_as_attribute = false;
    }
    config.brand_in_title |= overrides.brand_in_title;
    config.sku_in_variation_title |= overrides.sku_in_title;

    let result = convert_file(&source.input, source.sheet.as_deref(), &config)?;

    let content = match format {
        OutputFormat::Csv => result.table.to_csv_bytes()?,
        OutputFormat::Json => result.table.to_json()?.into_bytes(),
    };
    write_output(&content, output)?;

    if output.is_none() {
        eprintln!("💡 Redirect to {} to import it with WebToffee", DEFAULT_OUTPUT_NAME);
    }
    eprintln!("✨ Done!");
    Ok(())
}

fn write_output(content: &[u8], path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
