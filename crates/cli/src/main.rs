use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use stay_invoice::billing::{self, InvoiceTotals};
use stay_invoice::invoice::{self, format_date, format_rupees};
use stay_invoice::{Exporter, HotelProfile, StayForm};

/// Builds hotel stay invoices from a JSON form.
///
/// Fonts are looked up in `STAY_INVOICE_FONTS_DIR`, `assets/fonts` next to the binary and the
/// library's `assets/fonts`; see `assets/fonts/README.md`.
#[derive(Parser)]
#[command(author, version, about = "Hotel stay invoice generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a blank form to fill in.
    Template {
        /// Destination of the form.
        #[arg(short, long, default_value = "stay.json")]
        output: PathBuf,
    },

    /// Print the charge breakdown of a form.
    Totals {
        /// Form to bill.
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Render the invoice PDF for a form.
    Render {
        /// Form to render.
        #[arg(short, long)]
        input: PathBuf,

        /// Hotel profile overriding the built-in property details.
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Destination PDF; defaults to the guest's name.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Embed a raster snapshot of an invoice into an A3 PDF.
    #[command(aliases = ["raster"])]
    Snapshot {
        /// PNG or JPEG snapshot.
        #[arg(long)]
        image: PathBuf,

        /// Destination PDF.
        #[arg(short, long, default_value = "generated.pdf")]
        output: PathBuf,

        /// Document title stored in the PDF.
        #[arg(long, default_value = "Invoice")]
        title: String,
    },
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Template { output } => write_template(&output),
        Commands::Totals { input } => print_totals(&input),
        Commands::Render {
            input,
            profile,
            output,
        } => render(&input, profile.as_deref(), output.as_deref()),
        Commands::Snapshot {
            image,
            output,
            title,
        } => Exporter::new()
            .export_raster(&image, &title, &output)
            .map(|_| ())
            .map_err(Into::into),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn load_form(path: &Path) -> Result<StayForm, Box<dyn Error>> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read form {}: {}", path.display(), err))?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_template(output: &Path) -> Result<(), Box<dyn Error>> {
    let form = StayForm::default();
    fs::write(output, serde_json::to_string_pretty(&form)?)?;
    info!("Wrote blank form to {}", output.display());
    Ok(())
}

fn print_totals(input: &Path) -> Result<(), Box<dyn Error>> {
    let form = load_form(input)?;
    form.validate()?;
    let totals = billing::compute(&form);

    println!("Invoice {}", form.invoice_number());
    println!(
        "Stay: {} to {} ({} night(s))",
        format_date(form.check_in()),
        format_date(form.check_out()),
        totals.nights
    );
    print_lines(&totals);
    println!("Grand total: {}", format_rupees(totals.grand_total));
    println!("Advance paid: {}", format_rupees(totals.advance));
    println!("Advance due: {}", format_rupees(totals.due));
    Ok(())
}

fn print_lines(totals: &InvoiceTotals) {
    println!(
        "{:<10} {:<8} {:>7} {:>8} {:>10} {:>9} {:>8} {:>10}",
        "Room", "Food", "Persons", "Rate", "Amount", "GST 12%", "GST 5%", "Total"
    );
    for (room_type, line) in totals.lines() {
        println!(
            "{:<10} {:<8} {:>7} {:>8} {:>10} {:>9} {:>8} {:>10}",
            room_type.label(),
            line.food_type.label(),
            line.persons,
            line.rate_per_night,
            line.amount,
            line.accommodation_gst,
            line.food_gst,
            line.total
        );
    }
}

fn render(
    input: &Path,
    profile: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let form = load_form(input)?;
    let profile = match profile {
        Some(path) => HotelProfile::load(path)?,
        None => HotelProfile::default(),
    };
    let path = Exporter::new().export_invoice(form, &profile, invoice::today(), output)?;
    println!("Generated {}", path.display());
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
