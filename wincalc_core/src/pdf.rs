//! # PDF Generation Module
//!
//! Renders a [`Quote`] as a commercial offer document using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected via string replacement before compilation
//! - Only the fonts bundled with `typst-assets` are used, so rendering needs
//!   no files on disk
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use wincalc_core::catalog::Catalog;
//! use wincalc_core::pdf::render_quote_pdf;
//! use wincalc_core::quote::QuoteBuilder;
//! use wincalc_core::settings::PricingSettings;
//!
//! let catalog = Catalog::builtin();
//! let mut builder = QuoteBuilder::new(PricingSettings::default());
//! builder.add(1200.0, 1400.0, 2, catalog.profile("veka-softline-82")?, catalog.glazing("double-chamber")?)?;
//!
//! let pdf_bytes = render_quote_pdf(&builder.build(), "Offer 2025-014")?;
//! std::fs::write("offer.pdf", pdf_bytes).unwrap();
//! # Ok::<(), wincalc_core::errors::CalcError>(())
//! ```

use chrono::{Datelike, Local};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{CalcError, CalcResult};
use crate::quote::{Quote, QuoteLine};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Local::now();
        Datetime::from_ymd(now.year(), now.month().try_into().ok()?, now.day().try_into().ok()?)
    }
}

// ============================================================================
// PDF Template
// ============================================================================

const QUOTE_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2.5cm, bottom: 2.5cm, left: 2cm, right: 2cm),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 8pt, fill: gray)[Created with WinCalc]],
      align(right)[#text(size: 8pt, fill: gray)[Page #counter(page).display()]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 10pt)

#grid(
  columns: (1fr, auto),
  align(left)[#text(size: 20pt, weight: "bold")[{{TITLE}}]],
  align(right + bottom)[Date: {{DATE}}],
)

#v(6pt)
#line(length: 100%, stroke: 0.5pt)
#v(12pt)

#table(
  columns: (auto, auto, 1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt + gray,
  align: (right, left, left, right, right, right),
  table.header(
    [*Pos.*], [*Size (mm)*], [*Configuration*], [*Qty*], [*Unit price*], [*Sum*],
  ),
{{ROWS}}
)

#v(12pt)

#align(right)[
  #block(fill: rgb("#f0f0f0"), inset: 10pt, radius: 3pt)[
    #text(size: 9pt)[{{UNIT_COUNT}} units, {{TOTAL_AREA}} m² window area] \
    #text(size: 13pt, weight: "bold")[Total: {{GRAND_TOTAL}}]
  ]
]
"##;

// ============================================================================
// PDF Rendering
// ============================================================================

/// Render a quote to an A4 offer document.
///
/// # Arguments
///
/// * `quote` - Line items and grand total
/// * `title` - Document heading, e.g. the project name
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError)` - If the quote is empty or rendering fails
pub fn render_quote_pdf(quote: &Quote, title: &str) -> CalcResult<Vec<u8>> {
    if quote.is_empty() {
        return Err(CalcError::invalid_input("quote", "empty", "Quote has no lines to export"));
    }

    let source = quote_source(quote, title, &Local::now().format("%d.%m.%Y").to_string());

    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })?;

    tracing::debug!(lines = quote.lines.len(), bytes = pdf_bytes.len(), "rendered quote pdf");
    Ok(pdf_bytes)
}

/// Fill the template. User text goes in last and has its braces escaped, so
/// it can never be mistaken for a placeholder.
fn quote_source(quote: &Quote, title: &str, date: &str) -> String {
    QUOTE_TEMPLATE
        .replace("{{DATE}}", date)
        .replace("{{UNIT_COUNT}}", &quote.total_quantity().to_string())
        .replace("{{TOTAL_AREA}}", &format_decimal(quote.total_area_m2()))
        .replace("{{GRAND_TOTAL}}", &format_euros(quote.grand_total))
        .replace("{{ROWS}}", &build_rows(&quote.lines))
        .replace("{{TITLE}}", &escape_typst(title))
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '{' | '}' | '/' | '=' | '~' => {
                format!("\\{}", c)
            }
            _ => c.to_string(),
        })
        .collect()
}

fn build_rows(lines: &[QuoteLine]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                "  [{}], [{:.0} × {:.0}], [{} \\ #text(size: 8pt)[{}]], [{}], [{}], [{}],",
                i + 1,
                line.width,
                line.height,
                escape_typst(&line.profile_name),
                escape_typst(&line.glazing_name),
                line.quantity,
                format_euros(line.price_per_unit),
                format_euros(line.total_price),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `1234.5` -> `1.234,50 €`
fn format_euros(amount: f64) -> String {
    format!("{} €", format_decimal(amount))
}

/// Two decimals, comma as decimal separator, dots between thousands.
fn format_decimal(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::quote::QuoteBuilder;

    #[test]
    fn test_pdf_generation() {
        let catalog = Catalog::builtin();
        let mut builder = QuoteBuilder::default();
        builder
            .add(
                1200.0,
                1400.0,
                3,
                catalog.profile("salamander-bluevolution-92").unwrap(),
                catalog.glazing("triple-chamber-low-e").unwrap(),
            )
            .unwrap();
        builder
            .add(
                800.0,
                600.0,
                1,
                catalog.profile("veka-whs").unwrap(),
                catalog.glazing("single-chamber").unwrap(),
            )
            .unwrap();

        let pdf = render_quote_pdf(&builder.build(), "Miller house [ground floor] #2");
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_empty_quote_is_rejected() {
        let result = render_quote_pdf(&Quote::default(), "Nothing");
        assert!(matches!(result, Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("Room #1 [north]"), "Room \\#1 \\[north\\]");
        assert_eq!(escape_typst("a*b_c"), "a\\*b\\_c");
        assert_eq!(escape_typst("Plain text"), "Plain text");
    }

    #[test]
    fn test_placeholder_like_title_is_kept_literal() {
        let catalog = Catalog::builtin();
        let mut builder = QuoteBuilder::default();
        builder
            .add(1000.0, 1000.0, 1, catalog.profile("veka-whs").unwrap(), catalog.glazing("single-chamber").unwrap())
            .unwrap();
        let quote = builder.build();

        let source = quote_source(&quote, "{{GRAND_TOTAL}} {{ROWS}}", "16.10.2026");
        assert!(source.contains("\\{\\{GRAND\\_TOTAL\\}\\} \\{\\{ROWS\\}\\}"));
        assert_eq!(source.matches(&format_euros(quote.grand_total)).count(), 3);
        assert!(!source.contains("{{"));
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(0.0), "0,00");
        assert_eq!(format_decimal(345.0), "345,00");
        assert_eq!(format_decimal(1234.5), "1.234,50");
        assert_eq!(format_decimal(1234567.891), "1.234.567,89");
        assert_eq!(format_decimal(-42.0), "-42,00");
        assert_eq!(format_euros(1380.0), "1.380,00 €");
    }
}
