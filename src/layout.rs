//! Lays an [`Invoice`] out as a `genpdf` document.
//!
//! The page mirrors the on-screen invoice: a title banner, the property block, guest details,
//! the stay table with one column per package line, the payment summary and the house terms.
//! The stay table is assembled row by row from separate [`TableLayout`]s so that the room row
//! and the spanning rows can use their own column weights while the cell edges still line up.

use genpdf::elements::{
    Break, FrameCellDecorator, LinearLayout, OrderedList, Paragraph, TableLayout,
};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Document, Element, Margins};
use log::debug;

use crate::billing::{InvoiceTotals, LineCharges};
use crate::builder::DocumentBuilder;
use crate::elements::{self, Banner, Rule};
use crate::error::{ExportError, Result};
use crate::invoice::{format_date, format_rupees, Invoice};
use crate::profile::HotelProfile;
use crate::richtext::{self, Span};

/// Width weight shared by all package columns of the stay table.
const LINES_WEIGHT: usize = 60;
/// Width weight of the label column of the stay and guest tables.
const LABEL_WEIGHT: usize = 40;

const BASE_FONT_SIZE: u8 = 11;
const TITLE_FONT_SIZE: u8 = 40;
const BANNER_FONT_SIZE: u8 = 15;
const TOTAL_FONT_SIZE: u8 = 22;
const NOTE_FONT_SIZE: u8 = 9;
const FOOTER_HEIGHT_MM: i32 = 12;
const PAGE_MARGIN_MM: i32 = 10;
const LOGO_WIDTH_MM: f64 = 56.0;
const SMALL_LOGO_WIDTH_MM: f64 = 40.0;

/// Bytes of a rendered PDF document.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
}

/// Renders `invoice` with the property details of `profile`.
pub fn render_invoice(invoice: &Invoice, profile: &HotelProfile) -> Result<RenderedPdf> {
    let document = invoice_document(invoice, profile)?;
    let mut bytes = Vec::new();
    document.render(&mut bytes)?;
    debug!(
        "Rendered invoice {} ({} bytes)",
        invoice.number(),
        bytes.len()
    );
    Ok(RenderedPdf { bytes })
}

/// Builds the complete invoice document without rendering it.
pub fn invoice_document(invoice: &Invoice, profile: &HotelProfile) -> Result<Document> {
    let palette = Palette::from(profile);
    let footer_note = profile.footer_note.clone();

    let mut document = DocumentBuilder::new()
        .with_title(format!("Invoice {}", invoice.number()))
        .with_margins(Margins::all(PAGE_MARGIN_MM))
        .with_font_size(BASE_FONT_SIZE)
        .with_footer(FOOTER_HEIGHT_MM, move |_page| {
            Paragraph::new(footer_note.clone())
                .aligned(Alignment::Center)
                .styled(Style::new().with_font_size(NOTE_FONT_SIZE))
        })
        .build()?;

    document.push(title_banner(&palette));
    document.push(Break::new(1));
    document.push(property_block(invoice, profile, &palette)?);
    document.push(Break::new(1));

    document.push(section_banner("Guest Details", &palette));
    document.push(guest_table(invoice, &palette)?);
    document.push(Break::new(1));

    document.push(section_banner("Stay Details", &palette));
    document.push(stay_table(invoice, &palette)?);
    document.push(Break::new(1));

    document.push(total_bar(invoice.totals(), &palette)?);
    document.push(Break::new(1));
    document.push(house_notes(profile, &palette)?);

    Ok(document)
}

struct Palette {
    primary: Color,
    accent: Color,
    background: Color,
}

impl From<&HotelProfile> for Palette {
    fn from(profile: &HotelProfile) -> Self {
        Self {
            primary: profile.palette.primary.to_color(),
            accent: profile.palette.accent.to_color(),
            background: profile.palette.background.to_color(),
        }
    }
}

/// Background-colored title on a solid primary band.
fn title_banner(palette: &Palette) -> Banner {
    Banner::new("Your Invoice", palette.primary)
        .filled()
        .with_text_style(title_style(palette))
}

fn title_style(palette: &Palette) -> Style {
    Style::new()
        .bold()
        .with_font_size(TITLE_FONT_SIZE)
        .with_color(palette.background)
}

fn paragraph(spans: &[Span]) -> Paragraph {
    let mut paragraph = Paragraph::default();
    for span in spans {
        paragraph.push(span.to_styled_string());
    }
    paragraph
}

fn markup_paragraph(text: &str) -> Result<Paragraph> {
    let spans = richtext::parse_markup(text).map_err(|source| ExportError::Markup {
        text: text.to_owned(),
        source,
    })?;
    Ok(paragraph(&spans))
}

fn cell(text: impl Into<String>) -> impl Element {
    Paragraph::new(text.into())
        .aligned(Alignment::Center)
        .padded(Margins::trbl(1, 2, 1, 2))
}

fn label_cell(text: &str) -> impl Element {
    Paragraph::new(format!("{}:", text)).padded(Margins::trbl(1, 2, 1, 4))
}

fn framed_table(weights: Vec<usize>) -> TableLayout {
    let mut table = TableLayout::new(weights);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    table
}

fn section_banner(title: &str, palette: &Palette) -> Banner {
    Banner::new(title, palette.accent).with_text_style(
        Style::new()
            .bold()
            .with_font_size(BANNER_FONT_SIZE)
            .with_color(palette.accent),
    )
}

fn property_block(
    invoice: &Invoice,
    profile: &HotelProfile,
    palette: &Palette,
) -> Result<impl Element> {
    let details = LinearLayout::vertical()
        .element(paragraph(&richtext::label_value("Hotel Name", profile.name.as_str())))
        .element(paragraph(&richtext::label_value("GSTIN", profile.gstin.as_str())))
        .element(paragraph(&richtext::label_value("Address", profile.address.as_str())))
        .element(paragraph(&richtext::label_value(
            "Invoice Number",
            invoice.number().to_string(),
        )))
        .element(paragraph(&richtext::label_value("Contact", profile.contact.as_str())))
        .element(paragraph(&richtext::label_value(
            "Date",
            format_date(invoice.issued_on()),
        )));

    let mut block = TableLayout::new(vec![65, 35]);
    let mut row = block.row().element(details.padded(Margins::trbl(0, 4, 0, 6)));
    match &profile.logo {
        Some(path) => {
            row.push_element(elements::logo_from_path(path, LOGO_WIDTH_MM, Alignment::Right)?)
        }
        None => row.push_element(Paragraph::default()),
    }
    row.push()?;

    Ok(block.styled(Style::new().with_color(palette.primary)))
}

fn guest_table(invoice: &Invoice, palette: &Palette) -> Result<impl Element> {
    let guest = invoice.form().guest();
    let mut table = framed_table(vec![LABEL_WEIGHT, LINES_WEIGHT]);
    for (label, value) in [
        ("Name", &guest.name),
        ("Address", &guest.address),
        ("Contact", &guest.contact),
    ] {
        table
            .row()
            .element(label_cell(label))
            .element(Paragraph::new(value.clone()).padded(Margins::trbl(1, 2, 1, 2)))
            .push()?;
    }
    Ok(table.styled(Style::new().with_color(palette.primary)))
}

/// Column weights of the stay table: the label column followed by one column per package.
pub(crate) fn line_weights(line_count: usize) -> Vec<usize> {
    let per_line = LINES_WEIGHT / line_count.max(1);
    std::iter::once(LABEL_WEIGHT)
        .chain(std::iter::repeat(per_line).take(line_count))
        .collect()
}

/// Column weights of the room-type row: one column per room spanning its packages.
pub(crate) fn room_weights(totals: &InvoiceTotals) -> Vec<usize> {
    let line_count: usize = totals.rooms.iter().map(|room| room.lines.len()).sum();
    let per_line = LINES_WEIGHT / line_count.max(1);
    std::iter::once(LABEL_WEIGHT)
        .chain(totals.rooms.iter().map(|room| per_line * room.lines.len()))
        .collect()
}

fn spanning_row(label: &str, value: String, style: Style) -> Result<TableLayout> {
    let mut table = framed_table(vec![LABEL_WEIGHT, LINES_WEIGHT]);
    table
        .row()
        .element(label_cell(label))
        .element(cell(value).styled(style))
        .push()?;
    Ok(table)
}

fn per_line_row<F>(label: &str, totals: &InvoiceTotals, value: F) -> Result<TableLayout>
where
    F: Fn(&LineCharges) -> String,
{
    let lines: Vec<_> = totals.lines().collect();
    let mut table = framed_table(line_weights(lines.len()));
    let mut row = table.row().element(label_cell(label));
    for (_, line) in lines {
        row.push_element(cell(value(line)));
    }
    row.push()?;
    Ok(table)
}

fn stay_table(invoice: &Invoice, palette: &Palette) -> Result<impl Element> {
    let form = invoice.form();
    let totals = invoice.totals();
    let nights = totals.nights;

    let mut rooms = framed_table(room_weights(totals));
    let mut room_row = rooms.row().element(label_cell("Room Type"));
    for room in &totals.rooms {
        room_row.push_element(cell(room.room_type.label()));
    }
    room_row.push()?;

    let layout = LinearLayout::vertical()
        .element(spanning_row(
            "Check-in Date",
            format_date(form.check_in()),
            Style::new(),
        )?)
        .element(spanning_row(
            "Check-out Date",
            format_date(form.check_out()),
            Style::new(),
        )?)
        .element(rooms)
        .element(per_line_row("Package Rate / Person / Night", totals, |line| {
            format!("{} / {}", line.food_type, format_rupees(line.rate_per_night))
        })?)
        .element(per_line_row("Number of Persons", totals, |line| {
            line.persons.to_string()
        })?)
        .element(per_line_row("Number of Nights", totals, |_| {
            nights.to_string()
        })?)
        .element(per_line_row("Amount", totals, |line| line.amount.to_string())?)
        .element(per_line_row("GST 12% On Accommodation", totals, |line| {
            line.accommodation_gst.to_string()
        })?)
        .element(per_line_row("GST 5% on F&B", totals, |line| {
            line.food_gst.to_string()
        })?)
        .element(per_line_row("Total Package Charges", totals, |line| {
            line.total.to_string()
        })?)
        .element(spanning_row(
            "Grand Total",
            totals.grand_total.to_string(),
            Style::new().bold(),
        )?);

    Ok(layout.styled(Style::new().with_color(palette.primary)))
}

fn total_bar(totals: &InvoiceTotals, palette: &Palette) -> Result<impl Element> {
    let amounts = LinearLayout::vertical()
        .element(paragraph(&[
            Span::new("Advance Paid: "),
            Span::new(format_rupees(totals.advance)).bold(),
        ]))
        .element(paragraph(&[
            Span::new("Advance Due: "),
            Span::new(format_rupees(totals.due)).bold(),
        ]));

    let mut bar = TableLayout::new(vec![LABEL_WEIGHT, LINES_WEIGHT]);
    bar.row()
        .element(
            Paragraph::new("TOTAL")
                .styled(Style::new().bold().with_font_size(TOTAL_FONT_SIZE))
                .padded(Margins::trbl(2, 2, 2, 8)),
        )
        .element(amounts.padded(Margins::trbl(2, 2, 2, 2)))
        .push()?;

    Ok(LinearLayout::vertical()
        .element(Rule::new(palette.primary))
        .element(bar)
        .element(Rule::new(palette.primary))
        .styled(Style::new().with_color(palette.primary)))
}

fn house_notes(profile: &HotelProfile, palette: &Palette) -> Result<impl Element> {
    let mut terms = OrderedList::new();
    for term in &profile.terms {
        terms.push(markup_paragraph(term)?);
    }

    let notes = LinearLayout::vertical()
        .element(markup_paragraph(&profile.payment_note)?)
        .element(markup_paragraph(&profile.accepted_payments)?)
        .element(Break::new(1))
        .element(paragraph(&[
            Span::new("Terms & Conditions:").bold().colored(palette.accent)
        ]))
        .element(terms)
        .element(Break::new(1))
        .element(markup_paragraph(&profile.closing_note)?)
        .styled(Style::new().with_font_size(NOTE_FONT_SIZE));

    let mut block = TableLayout::new(vec![75, 25]);
    let mut row = block.row().element(notes.padded(Margins::trbl(0, 4, 0, 4)));
    match &profile.small_logo {
        Some(path) => row.push_element(elements::logo_from_path(
            path,
            SMALL_LOGO_WIDTH_MM,
            Alignment::Center,
        )?),
        None => row.push_element(Paragraph::default()),
    }
    row.push()?;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::RoomCharges;
    use crate::model::{FoodType, RoomType};

    fn line(total: i64) -> LineCharges {
        LineCharges {
            food_type: FoodType::Veg,
            persons: 1,
            rate_per_night: total,
            amount: total,
            accommodation_gst: 0,
            food_gst: 0,
            total,
        }
    }

    fn totals(food_per_room: &[usize]) -> InvoiceTotals {
        InvoiceTotals {
            nights: 1,
            rooms: food_per_room
                .iter()
                .map(|&count| RoomCharges {
                    room_type: RoomType::Villa,
                    lines: vec![line(100); count],
                })
                .collect(),
            grand_total: 0,
            advance: 0,
            due: 0,
        }
    }

    #[test]
    fn title_prints_in_background_color() {
        let profile = HotelProfile::default();
        let palette = Palette::from(&profile);
        assert_eq!(palette.background, Color::Rgb(0xc6, 0xb1, 0x6e));

        let style = title_style(&palette);
        assert_eq!(style.color(), Some(palette.background));
        assert_ne!(style.color(), Some(palette.primary));
    }

    #[test]
    fn line_weights_split_evenly() {
        assert_eq!(line_weights(1), vec![40, 60]);
        assert_eq!(line_weights(4), vec![40, 15, 15, 15, 15]);
        assert_eq!(line_weights(6), vec![40, 10, 10, 10, 10, 10, 10]);
    }

    #[test]
    fn room_weights_span_their_packages() {
        let totals = totals(&[2, 1, 2]);
        assert_eq!(room_weights(&totals), vec![40, 24, 12, 24]);

        let line_sum: usize = line_weights(5).iter().skip(1).sum();
        let room_sum: usize = room_weights(&totals).iter().skip(1).sum();
        assert_eq!(line_sum, room_sum);
    }
}
