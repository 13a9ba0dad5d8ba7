//! Certificate PDF rendering.
//!
//! One A4 page, fixed layout: colored header banner, certificate-number
//! strip, three labeled sections as two-column field grids, a color-coded
//! result callout, a footer with the issuance timestamp and legal
//! disclaimer, and two signature lines. Everything is static-positioned;
//! long values may clip, which is an accepted limitation.
//!
//! Built-in Helvetica fonts keep the output independent of system font
//! paths.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::io::BufWriter;
use thiserror::Error;

/// The single failure kind rendering can produce.
#[derive(Error, Debug)]
#[error("failed to render certificate: {0}")]
pub struct PdfError(String);

/// Everything the renderer needs; enums arrive already stringified the way
/// they are stored.
#[derive(Debug, Clone)]
pub struct CertificateData {
    pub certificate_number: String,
    pub pet_name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub sex: String,
    pub test_type: String,
    pub test_brand: String,
    pub test_date: NaiveDate,
    pub result: String,
    pub vet_name: String,
    pub clinic_name: String,
    pub district: String,
    pub issued_at: DateTime<Utc>,
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 3.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const PRIMARY: (u8, u8, u8) = (0x4c, 0x6e, 0xf5);
const LIGHT_GRAY: (u8, u8, u8) = (0xf8, 0xf9, 0xfa);
const SECTION_GRAY: (u8, u8, u8) = (0xe9, 0xec, 0xef);
const TEXT: (u8, u8, u8) = (0x21, 0x25, 0x29);
const LABEL: (u8, u8, u8) = (0x6c, 0x75, 0x7d);
const SECTION_TEXT: (u8, u8, u8) = (0x49, 0x50, 0x57);

/// Fill and text color pairing for the result callout box.
pub fn result_palette(result: &str) -> ((u8, u8, u8), (u8, u8, u8)) {
    match result {
        "NEGATIVO" => ((212, 237, 218), (21, 87, 36)),
        "POSITIVO" => ((248, 215, 218), (114, 28, 36)),
        _ => ((255, 243, 205), (133, 100, 4)),
    }
}

pub fn render_certificate(data: &CertificateData) -> Result<Vec<u8>, PdfError> {
    let (doc, page, layer) = PdfDocument::new(
        "Certificado de Descarte",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PdfError(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| PdfError(e.to_string()))?;

    // Header banner
    fill_rect(&layer, 0.0, 0.0, PAGE_WIDTH, 30.0, PRIMARY);
    layer.set_fill_color(rgb((255, 255, 255)));
    text_centered(&layer, "CERTIFICADO DE DESCARTE", 24.0, 15.0, &bold);
    text_centered(&layer, "Prueba Diagnóstica Veterinaria", 14.0, 22.0, &regular);

    // Certificate number strip
    fill_rect(&layer, 0.0, 35.0, PAGE_WIDTH, 10.0, LIGHT_GRAY);
    layer.set_fill_color(rgb(PRIMARY));
    let number_line = format!("N° Certificado: {}", data.certificate_number);
    text_centered(&layer, &number_line, 14.0, 42.0, &bold);

    let mut y = 50.0;

    // Patient section
    section_header(&layer, "DATOS DEL PACIENTE", y, &bold);
    y += 12.0;
    y = field_grid(
        &layer,
        &[
            ("NOMBRE DEL PACIENTE", data.pet_name.as_str()),
            ("ESPECIE", data.species.as_str()),
            ("RAZA", data.breed.as_str()),
            ("EDAD", data.age.as_str()),
            ("SEXO", data.sex.as_str()),
        ],
        y,
        &regular,
        &bold,
    );
    y += 10.0;

    // Test section
    y += 8.0;
    section_header(&layer, "DATOS DE LA PRUEBA", y, &bold);
    y += 12.0;
    let test_date = format_date_long(data.test_date);
    y = field_grid(
        &layer,
        &[
            ("TIPO DE PRUEBA", data.test_type.as_str()),
            ("MARCA DEL TEST", data.test_brand.as_str()),
            ("FECHA DE LA PRUEBA", test_date.as_str()),
        ],
        y,
        &regular,
        &bold,
    );
    y += 15.0;

    // Result callout
    let (box_color, box_text) = result_palette(&data.result);
    layer.set_outline_color(rgb(box_text));
    layer.set_outline_thickness(1.0);
    layer.set_fill_color(rgb(box_color));
    layer.add_rect(
        Rect::new(
            Mm(MARGIN),
            from_top(y + 25.0),
            Mm(MARGIN + CONTENT_WIDTH),
            from_top(y),
        )
        .with_mode(PaintMode::FillStroke)
        .with_winding(WindingOrder::NonZero),
    );
    layer.set_fill_color(rgb(box_text));
    text_centered(&layer, "RESULTADO", 11.0, y + 8.0, &bold);
    text_centered(&layer, &data.result, 28.0, y + 18.0, &bold);
    y += 25.0 + 15.0;

    // Vet section
    section_header(&layer, "VETERINARIA RESPONSABLE", y, &bold);
    y += 12.0;
    field_grid(
        &layer,
        &[
            ("VETERINARIO", data.vet_name.as_str()),
            ("CLÍNICA", data.clinic_name.as_str()),
            ("DISTRITO", data.district.as_str()),
        ],
        y,
        &regular,
        &bold,
    );

    // Footer
    let footer_top = PAGE_HEIGHT - 50.0;
    fill_rect(
        &layer,
        0.0,
        footer_top,
        PAGE_WIDTH,
        PAGE_HEIGHT - footer_top,
        LIGHT_GRAY,
    );
    layer.set_fill_color(rgb(LABEL));
    let issued = format_datetime(data.issued_at);
    let mut line_y = footer_top + 8.0;
    layer.use_text(
        format!("Fecha y hora de emisión: {}", issued),
        10.0,
        Mm(MARGIN),
        from_top(line_y),
        &regular,
    );
    line_y += 5.0;
    let disclaimer = "Validez: Este certificado es válido únicamente para la fecha y prueba \
                      especificadas. No constituye un diagnóstico médico definitivo y debe ser \
                      interpretado por un veterinario profesional.";
    for line in wrap_text(disclaimer, 110) {
        layer.use_text(line, 10.0, Mm(MARGIN), from_top(line_y), &regular);
        line_y += 5.0;
    }

    // Signature lines
    let signature_y = PAGE_HEIGHT - 20.0;
    let signature_width = (CONTENT_WIDTH - 20.0) / 2.0;
    layer.set_outline_color(rgb((0, 0, 0)));
    layer.set_outline_thickness(0.5);
    draw_line(&layer, MARGIN, signature_y, MARGIN + signature_width);
    draw_line(
        &layer,
        MARGIN + signature_width + 20.0,
        signature_y,
        MARGIN + CONTENT_WIDTH,
    );
    layer.set_fill_color(rgb(SECTION_TEXT));
    text_centered_at(
        &layer,
        "Firma del Veterinario",
        9.0,
        MARGIN + signature_width / 2.0,
        signature_y + 5.0,
        &bold,
    );
    text_centered_at(
        &layer,
        "Sello de la Clínica",
        9.0,
        MARGIN + signature_width + 20.0 + signature_width / 2.0,
        signature_y + 5.0,
        &bold,
    );

    let mut buffer = BufWriter::new(Vec::new());
    doc.save(&mut buffer).map_err(|e| PdfError(e.to_string()))?;
    buffer
        .into_inner()
        .map_err(|e| PdfError(e.to_string()))
}

/// Layout runs top-down like the original template; PDF space grows upward.
fn from_top(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn fill_rect(layer: &PdfLayerReference, x: f32, top: f32, width: f32, height: f32, color: (u8, u8, u8)) {
    layer.set_fill_color(rgb(color));
    layer.add_rect(
        Rect::new(Mm(x), from_top(top + height), Mm(x + width), from_top(top))
            .with_mode(PaintMode::Fill)
            .with_winding(WindingOrder::NonZero),
    );
}

fn draw_line(layer: &PdfLayerReference, x1: f32, top: f32, x2: f32) {
    let line = Line {
        points: vec![
            (Point::new(Mm(x1), from_top(top)), false),
            (Point::new(Mm(x2), from_top(top)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

/// Approximate centering for built-in Helvetica; close enough for a fixed
/// layout where clipping is accepted.
fn text_width_mm(text: &str, size: f32) -> f32 {
    const PT_TO_MM: f32 = 0.352_78;
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

fn text_centered(layer: &PdfLayerReference, text: &str, size: f32, top: f32, font: &IndirectFontRef) {
    text_centered_at(layer, text, size, PAGE_WIDTH / 2.0, top, font);
}

fn text_centered_at(
    layer: &PdfLayerReference,
    text: &str,
    size: f32,
    center_x: f32,
    top: f32,
    font: &IndirectFontRef,
) {
    let x = center_x - text_width_mm(text, size) / 2.0;
    layer.use_text(text, size, Mm(x), from_top(top), font);
}

fn section_header(layer: &PdfLayerReference, title: &str, top: f32, bold: &IndirectFontRef) {
    fill_rect(layer, MARGIN, top, CONTENT_WIDTH, 8.0, SECTION_GRAY);
    fill_rect(layer, MARGIN, top, 4.0, 8.0, PRIMARY);
    layer.set_fill_color(rgb(SECTION_TEXT));
    layer.use_text(title, 11.0, Mm(MARGIN + 6.0), from_top(top + 5.5), bold);
}

/// Renders label/value pairs in a two-column grid starting at `top`; returns
/// the top coordinate of the last row.
fn field_grid(
    layer: &PdfLayerReference,
    fields: &[(&str, &str)],
    top: f32,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) -> f32 {
    let column_width = CONTENT_WIDTH / 2.0;
    let mut row_top = top;

    for (index, (label, value)) in fields.iter().enumerate() {
        let x = if index % 2 == 0 {
            MARGIN
        } else {
            MARGIN + column_width
        };
        if index > 0 && index % 2 == 0 {
            row_top += 10.0;
        }

        layer.set_fill_color(rgb(LABEL));
        layer.use_text(*label, 9.0, Mm(x), from_top(row_top), bold);

        let value = if value.is_empty() { "-" } else { value };
        layer.set_fill_color(rgb(TEXT));
        layer.use_text(value, 13.0, Mm(x), from_top(row_top + 5.0), regular);
    }

    row_top
}

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

fn format_date_long(date: NaiveDate) -> String {
    format!(
        "{:02} de {} de {}",
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year()
    )
}

fn format_datetime(at: DateTime<Utc>) -> String {
    format!(
        "{:02}/{:02}/{} a las {:02}:{:02}",
        at.day(),
        at.month(),
        at.year(),
        at.hour(),
        at.minute()
    )
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> CertificateData {
        CertificateData {
            certificate_number: "CERT-20240115-0001".to_string(),
            pet_name: "Max".to_string(),
            species: "Canino".to_string(),
            breed: "Labrador".to_string(),
            age: "2 años".to_string(),
            sex: "Macho".to_string(),
            test_type: "Rabia".to_string(),
            test_brand: "BioVet".to_string(),
            test_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            result: "NEGATIVO".to_string(),
            vet_name: "Dra. Pérez".to_string(),
            clinic_name: "Clínica Sur".to_string(),
            district: "Miraflores".to_string(),
            issued_at: Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn renders_a_pdf() {
        let bytes = render_certificate(&sample()).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "missing PDF magic bytes");
        assert!(bytes.len() > 500);
    }

    #[test]
    fn renders_every_result_variant() {
        for result in ["NEGATIVO", "POSITIVO", "INDETERMINADO"] {
            let mut data = sample();
            data.result = result.to_string();
            assert!(render_certificate(&data).is_ok(), "render failed for {}", result);
        }
    }

    #[test]
    fn negative_result_uses_green_pairing() {
        let (fill, text) = result_palette("NEGATIVO");
        assert_eq!(fill, (212, 237, 218));
        assert_eq!(text, (21, 87, 36));
    }

    #[test]
    fn positive_result_uses_red_pairing() {
        let (fill, text) = result_palette("POSITIVO");
        assert_eq!(fill, (248, 215, 218));
        assert_eq!(text, (114, 28, 36));
    }

    #[test]
    fn other_results_use_neutral_pairing() {
        assert_eq!(result_palette("INDETERMINADO").0, (255, 243, 205));
        assert_eq!(result_palette("anything"), result_palette("INDETERMINADO"));
    }

    #[test]
    fn spanish_long_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(format_date_long(date), "15 de enero de 2024");
    }

    #[test]
    fn wraps_the_disclaimer() {
        let lines = wrap_text("uno dos tres cuatro cinco", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "uno dos tres cuatro cinco");
    }
}
