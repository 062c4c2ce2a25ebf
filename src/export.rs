//! Turning a form into a PDF file on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use log::info;

use crate::error::{ExportError, Result};
use crate::invoice::Invoice;
use crate::layout::{self, RenderedPdf};
use crate::model::StayForm;
use crate::profile::HotelProfile;
use crate::raster;

const PDF_EXTENSION: &str = ".pdf";
const FALLBACK_FILE_NAME: &str = "generated.pdf";

/// Derives the output file name from the guest's name.
///
/// Path separators and control characters become `_`, `.pdf` is appended unless the name already
/// ends with it, and a blank name yields `generated.pdf`.
pub fn pdf_file_name(guest_name: &str) -> String {
    let trimmed = guest_name.trim();
    if trimmed.is_empty() {
        return FALLBACK_FILE_NAME.to_owned();
    }

    let mut name: String = trimmed
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if !name.to_ascii_lowercase().ends_with(PDF_EXTENSION) {
        name.push_str(PDF_EXTENSION);
    }
    name
}

/// Runs exports one at a time.
///
/// The exporter carries a busy flag: while one export is running, a second request on the same
/// exporter fails with [`ExportError::Busy`] instead of starting a parallel render.
#[derive(Debug, Default)]
pub struct Exporter {
    busy: AtomicBool,
}

/// Holds the exporter's busy flag; releases it when dropped.
#[derive(Debug)]
pub struct ExportGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an export is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claims the busy flag for the duration of the returned guard.
    pub fn begin(&self) -> Result<ExportGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(ExportGuard { busy: &self.busy })
    }

    /// Renders the invoice for `form` and writes it to `output`, or to a file named after the
    /// guest in the current directory.  Returns the path written.
    pub fn export_invoice(
        &self,
        form: StayForm,
        profile: &HotelProfile,
        issued_on: NaiveDate,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let _guard = self.begin()?;

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(pdf_file_name(&form.guest().name)));
        let invoice = Invoice::prepare(form, issued_on)?;
        let pdf = layout::render_invoice(&invoice, profile)?;
        write_pdf(&path, &pdf)?;

        info!(
            "Exported invoice {} for grand total {} to {}",
            invoice.number(),
            invoice.totals().grand_total,
            path.display()
        );
        Ok(path)
    }

    /// Embeds the raster snapshot at `image` into an A3 PDF written to `output`.
    pub fn export_raster(&self, image: &Path, title: &str, output: &Path) -> Result<PathBuf> {
        let _guard = self.begin()?;

        let pdf = raster::embed_raster_file(image, title)?;
        write_pdf(output, &pdf)?;

        info!(
            "Exported raster {} to {}",
            image.display(),
            output.display()
        );
        Ok(output.to_path_buf())
    }
}

fn write_pdf(path: &Path, pdf: &RenderedPdf) -> Result<()> {
    fs::write(path, &pdf.bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_guest_name() {
        assert_eq!(pdf_file_name("Asha Rao"), "Asha Rao.pdf");
        assert_eq!(pdf_file_name("  Asha Rao.PDF "), "Asha Rao.PDF");
        assert_eq!(pdf_file_name("a/b\\c:d"), "a_b_c_d.pdf");
        assert_eq!(pdf_file_name("tab\there"), "tab_here.pdf");
    }

    #[test]
    fn blank_name_uses_fallback() {
        assert_eq!(pdf_file_name(""), "generated.pdf");
        assert_eq!(pdf_file_name("   "), "generated.pdf");
    }

    #[test]
    fn busy_flag_blocks_reentry() {
        let exporter = Exporter::new();
        let guard = exporter.begin().expect("first export starts");
        assert!(exporter.is_busy());
        assert!(matches!(exporter.begin(), Err(ExportError::Busy)));

        drop(guard);
        assert!(!exporter.is_busy());
        assert!(exporter.begin().is_ok());
    }

    #[test]
    fn busy_flag_is_released_after_failure() {
        let exporter = Exporter::new();
        let result = exporter.export_raster(
            Path::new("/__stay_invoice_missing__/snapshot.png"),
            "Snapshot",
            Path::new("/__stay_invoice_missing__/out.pdf"),
        );
        assert!(matches!(result, Err(ExportError::Io { .. })));
        assert!(!exporter.is_busy());
    }

    #[test]
    fn invalid_form_is_rejected_before_rendering() {
        let exporter = Exporter::new();
        let json = r#"{ "checkIn": "2024-05-03", "checkOut": "2024-05-01" }"#;
        let form: StayForm = serde_json::from_str(json).expect("deserialize");
        let issued_on = NaiveDate::from_ymd_opt(2024, 5, 3).expect("valid date");

        let result = exporter.export_invoice(form, &HotelProfile::default(), issued_on, None);
        assert!(matches!(result, Err(ExportError::Form(_))));
        assert!(!exporter.is_busy());
    }
}
