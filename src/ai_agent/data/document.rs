//! PDF text extraction for uploaded financial documents.
//!
//! Page content is decoded into positioned text runs and regrouped into
//! visual lines, top of the page first. Each page contributes its lines
//! followed by any table-like rows found on it, flattened to comma-joined
//! cells. The combined text is cleaned of blank lines and runs of horizontal
//! whitespace before the agents see it.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static CELL_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+|\s{2,}").unwrap());

// Runs whose baselines differ by no more than this many units share a line.
const SAME_LINE_TOLERANCE: f32 = 2.0;

#[derive(Error, Debug)]
pub enum DocumentError {
  #[error("Failed to load PDF: {0}")]
  LoadError(String),

  #[error("Failed to extract text from page {page}: {message}")]
  ExtractionError { page: u32, message: String },

  #[error("PDF has no pages")]
  Empty,
}

/// Text drawn at one position of the page.
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
  x: f32,
  y: f32,
  text: String,
}

/// Reads a PDF from disk and returns its cleaned text content.
pub fn read_document(path: &Path) -> Result<String, DocumentError> {
  let doc: Document = Document::load(path).map_err(|e| DocumentError::LoadError(e.to_string()))?;

  let pages: BTreeMap<u32, ObjectId> = doc.get_pages();
  if pages.is_empty() {
    return Err(DocumentError::Empty);
  }

  let mut text_data: Vec<String> = Vec::with_capacity(pages.len());
  for (page_num, page_id) in &pages {
    let runs: Vec<TextRun> = page_runs(&doc, *page_id)
      .map_err(|e| DocumentError::ExtractionError { page: *page_num, message: e.to_string() })?;
    text_data.push(render_page(&group_lines(runs)));
  }

  log::debug!("Extracted {} page(s) from {}", text_data.len(), path.display());

  Ok(clean_text(&text_data.join("\n")))
}

fn number(operands: &[Object], index: usize) -> f32 {
  operands.get(index).and_then(|operand| operand.as_float().ok()).unwrap_or(0.0)
}

fn decode_shown_text(encoding: &Encoding, operand: &Object) -> lopdf::Result<String> {
  match operand {
    Object::String(bytes, _) => Document::decode_text(encoding, bytes),
    Object::Array(items) => {
      let mut text: String = String::new();
      for item in items {
        match item {
          Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)?),
          // wide negative kerning separates words
          Object::Integer(offset) if *offset < -100 => text.push(' '),
          Object::Real(offset) if *offset < -100.0 => text.push(' '),
          _ => {}
        }
      }
      Ok(text)
    }
    _ => Ok(String::new()),
  }
}

/// Walks the page content stream and records every shown string at the text
/// position it was drawn from. Consecutive strings drawn without moving the
/// position are merged into one run.
fn page_runs(doc: &Document, page_id: ObjectId) -> lopdf::Result<Vec<TextRun>> {
  let encodings: BTreeMap<Vec<u8>, Encoding> = doc
    .get_page_fonts(page_id)?
    .into_iter()
    .map(|(name, font)| font.get_font_encoding(doc).map(|encoding| (name, encoding)))
    .collect::<lopdf::Result<BTreeMap<Vec<u8>, Encoding>>>()?;
  let content: Content = doc.get_and_decode_page_content(page_id)?;

  let mut runs: Vec<TextRun> = Vec::new();
  let mut encoding: Option<&Encoding> = None;
  let (mut x, mut y, mut leading): (f32, f32, f32) = (0.0, 0.0, 0.0);

  for operation in &content.operations {
    let operands: &[Object] = &operation.operands;
    match operation.operator.as_str() {
      "BT" => {
        x = 0.0;
        y = 0.0;
      }
      "Tf" => {
        encoding = operands.first()
          .and_then(|name| name.as_name().ok())
          .and_then(|name| encodings.get(name));
      }
      "Td" | "TD" => {
        if operation.operator == "TD" {
          leading = -number(operands, 1);
        }
        x += number(operands, 0);
        y += number(operands, 1);
      }
      "Tm" => {
        x = number(operands, 4);
        y = number(operands, 5);
      }
      "TL" => leading = number(operands, 0),
      "T*" => y -= leading,
      "Tj" | "TJ" | "'" | "\"" => {
        if operation.operator == "'" || operation.operator == "\"" {
          y -= leading;
        }
        let text: String = match (encoding, operands.last()) {
          (Some(encoding), Some(shown)) => decode_shown_text(encoding, shown)?,
          (None, _) => {
            log::warn!("Text shown without a font on page {:?}, skipping it", page_id);
            continue;
          }
          (_, None) => continue,
        };

        match runs.last_mut() {
          Some(last) if last.x == x && last.y == y => last.text.push_str(&text),
          _ => runs.push(TextRun { x, y, text }),
        }
      }
      _ => {}
    }
  }

  Ok(runs)
}

/// Groups runs sharing a baseline into lines, top of the page first and
/// left to right within a line.
fn group_lines(runs: Vec<TextRun>) -> Vec<Vec<String>> {
  let mut lines: Vec<(f32, Vec<TextRun>)> = Vec::new();
  for run in runs {
    match lines.iter_mut().find(|(y, _)| (*y - run.y).abs() <= SAME_LINE_TOLERANCE) {
      Some((_, line)) => line.push(run),
      None => lines.push((run.y, vec![run])),
    }
  }
  lines.sort_by(|a, b| b.0.total_cmp(&a.0));

  lines
    .into_iter()
    .map(|(_, mut line)| {
      line.sort_by(|a, b| a.x.total_cmp(&b.x));
      line.into_iter().map(|run| run.text).filter(|text| !text.trim().is_empty()).collect::<Vec<String>>()
    })
    .filter(|line| !line.is_empty())
    .collect()
}

/// Page lines followed by the page's table rows, cells comma-joined and rows newline-joined.
pub fn render_page(lines: &[Vec<String>]) -> String {
  let page_text: String = lines.iter().map(|line| line.join(" ")).collect::<Vec<String>>().join("\n");

  let rows: Vec<Vec<String>> = detect_table_rows(lines);
  if rows.is_empty() {
    return page_text;
  }

  let table_text: String = rows.iter().map(|row| row.join(", ")).collect::<Vec<String>>().join("\n");
  format!("{}\n{}", page_text, table_text)
}

/// Rows of a page laid out as a table: two or more consecutive lines that
/// each hold several cells. Cells are separately positioned runs, further
/// split on tabs or wide gaps inside a run.
pub fn detect_table_rows(lines: &[Vec<String>]) -> Vec<Vec<String>> {
  let mut rows: Vec<Vec<String>> = Vec::new();
  let mut block: Vec<Vec<String>> = Vec::new();

  for line in lines {
    match split_cells(line) {
      Some(cells) => block.push(cells),
      None => {
        if block.len() >= 2 {
          rows.append(&mut block);
        }
        block.clear();
      }
    }
  }
  if block.len() >= 2 {
    rows.append(&mut block);
  }

  return rows;
}

fn split_cells(line: &[String]) -> Option<Vec<String>> {
  let cells: Vec<String> = line
    .iter()
    .flat_map(|run| CELL_GAP.split(run.trim()))
    .map(str::trim)
    .filter(|cell| !cell.is_empty())
    .map(String::from)
    .collect();

  if cells.len() >= 2 {
    Some(cells)
  } else {
    None
  }
}

/// Collapses blank lines and horizontal whitespace runs, then trims.
pub fn clean_text(content: &str) -> String {
  let cleaned = BLANK_LINES.replace_all(content, "\n");
  let cleaned = HORIZONTAL_SPACE.replace_all(&cleaned, " ");
  cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use lopdf::content::Operation;
  use lopdf::{dictionary, Stream};
  use std::io::Write;

  fn lines(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter().map(|row| row.iter().map(|run| run.to_string()).collect()).collect()
  }

  /// One BT/ET block drawing `text` at (x, y).
  fn text_at(x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
      Operation::new("BT", vec![]),
      Operation::new("Tf", vec!["F1".into(), 10.into()]),
      Operation::new("Td", vec![x.into(), y.into()]),
      Operation::new("Tj", vec![Object::string_literal(text)]),
      Operation::new("ET", vec![]),
    ]
  }

  fn write_pdf(pages: Vec<Vec<Operation>>) -> tempfile::NamedTempFile {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
      "Type" => "Font",
      "Subtype" => "Type1",
      "BaseFont" => "Helvetica",
      "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
      "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
      let content = Content { operations };
      let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
      let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
      });
      kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
      "Type" => "Pages",
      "Kids" => kids,
      "Count" => count,
      "Resources" => resources_id,
      "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    }));
    let catalog_id = doc.add_object(dictionary! {
      "Type" => "Catalog",
      "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    doc.save_to(&mut file).unwrap();
    file
  }

  #[test]
  fn clean_text_collapses_blank_lines_and_spaces() {
    let raw = "  Balance Sheet\n\n\n   Total\t\tAssets   100 \n \nEnd  ";
    assert_eq!(clean_text(raw), "Balance Sheet\n Total Assets 100 \nEnd");
  }

  #[test]
  fn table_rows_are_flattened_after_the_page_text() {
    let page = lines(&[&["Income Statement"], &["Item", "2023", "2022"], &["Revenue", "$10M", "$8M"], &["See notes."]]);
    let expected = "Income Statement\nItem 2023 2022\nRevenue $10M $8M\nSee notes.\nItem, 2023, 2022\nRevenue, $10M, $8M";

    assert_eq!(render_page(&page), expected);
  }

  #[test]
  fn a_single_multi_cell_line_is_not_a_table() {
    let page = lines(&[&["Title", "Page 1"], &["Plain narrative text follows."]]);
    assert!(detect_table_rows(&page).is_empty());
    assert_eq!(render_page(&page), "Title Page 1\nPlain narrative text follows.");
  }

  #[test]
  fn gaps_inside_a_run_split_cells() {
    let rows = detect_table_rows(&lines(&[&["Ratio\tValue"], &["Current Ratio    1.5"], &["footer"]]));
    assert_eq!(rows, vec![vec!["Ratio", "Value"], vec!["Current Ratio", "1.5"]]);
  }

  #[test]
  fn runs_are_grouped_by_baseline_top_down() {
    let runs = vec![
      TextRun { x: 300.0, y: 690.0, text: "2022".to_string() },
      TextRun { x: 72.0, y: 720.0, text: "Balance Sheet".to_string() },
      TextRun { x: 72.0, y: 690.5, text: "Item".to_string() },
      TextRun { x: 200.0, y: 689.0, text: "2023".to_string() },
      TextRun { x: 90.0, y: 700.0, text: "  ".to_string() },
    ];
    assert_eq!(group_lines(runs), lines(&[&["Balance Sheet"], &["Item", "2023", "2022"]]));
  }

  #[test]
  fn separately_positioned_cells_become_a_table_row() {
    let mut operations = text_at(72, 740, "Revenue: $25.0B");
    for (y, row) in [(700, ["Item", "2023", "2022"]), (685, ["Current Ratio", "0.8", "1.1"])] {
      for (x, cell) in [72, 200, 300].into_iter().zip(row) {
        operations.extend(text_at(x, y, cell));
      }
    }
    let file = write_pdf(vec![operations]);

    let text = read_document(file.path()).unwrap();
    assert!(text.contains("Item, 2023, 2022\nCurrent Ratio, 0.8, 1.1"));
    assert!(text.starts_with("Revenue: $25.0B\n"));
  }

  #[test]
  fn pages_are_read_in_order_with_their_tables() {
    let mut first = text_at(72, 720, "Income Statement");
    // drawn bottom row first; the reader restores top-down order
    first.extend(text_at(72, 675, "Revenue"));
    first.extend(text_at(200, 675, "$25.0B"));
    first.extend(text_at(300, 675, "$21.0B"));
    first.extend(text_at(72, 690, "Item"));
    first.extend(text_at(200, 690, "2023"));
    first.extend(text_at(300, 690, "2022"));

    let second = vec![
      Operation::new("BT", vec![]),
      Operation::new("Tf", vec!["F1".into(), 12.into()]),
      Operation::new("Td", vec![72.into(), 720.into()]),
      Operation::new("Tj", vec![Object::string_literal("Current Ratio:   1.4")]),
      Operation::new("Td", vec![0.into(), (-20).into()]),
      Operation::new("TJ", vec![Object::Array(vec![
        Object::string_literal("Debt-to-Equity:"),
        (-250).into(),
        Object::string_literal("0.9"),
      ])]),
      Operation::new("ET", vec![]),
    ];
    let file = write_pdf(vec![first, second]);

    assert_eq!(
      read_document(file.path()).unwrap(),
      "Income Statement\nItem 2023 2022\nRevenue $25.0B $21.0B\nItem, 2023, 2022\nRevenue, $25.0B, $21.0B\n\
       Current Ratio: 1.4\nDebt-to-Equity: 0.9"
    );
  }

  #[test]
  fn missing_file_is_a_load_error() {
    let err = read_document(Path::new("/nonexistent/statement.pdf")).unwrap_err();
    assert!(matches!(err, DocumentError::LoadError(_)));
  }

  #[test]
  fn non_pdf_bytes_are_a_load_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"definitely not a pdf").unwrap();

    let err = read_document(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("Failed to load PDF"));
  }
}
