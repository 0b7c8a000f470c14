//! Spreadsheet workbook rendering.
//!
//! [`build_workbook`] lowers an itinerary into a logical row/column model; the binary
//! encoding is delegated to a [`SheetEncoder`], treated as a black box that accepts the
//! model and returns bytes. [`XmlSheetEncoder`] is the built-in encoder, emitting the
//! SpreadsheetML 2003 dialect Excel opens directly; swap in a dedicated workbook writer
//! through the trait when binary `.xlsx` output is required.

// self
use crate::{
	itinerary::Itinerary,
	render::{RenderError, short_date},
};

/// Logical workbook handed to a [`SheetEncoder`].
#[derive(Clone, Debug, PartialEq)]
pub struct Workbook {
	/// Ordered worksheets.
	pub sheets: Vec<Sheet>,
}

/// One worksheet of a [`Workbook`].
#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
	/// Worksheet name shown on the tab.
	pub name: String,
	/// Ordered rows.
	pub rows: Vec<Row>,
}

/// One row of a [`Sheet`].
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
	/// Marks a heading row encoders may style distinctly.
	pub header: bool,
	/// Ordered cells.
	pub cells: Vec<Cell>,
}
impl Row {
	/// Builds a heading row of text cells.
	pub fn header<I, S>(cells: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { header: true, cells: cells.into_iter().map(Cell::text).collect() }
	}

	/// Builds a data row.
	pub fn data(cells: impl IntoIterator<Item = Cell>) -> Self {
		Self { header: false, cells: cells.into_iter().collect() }
	}
}

/// One cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
	/// Textual cell.
	Text(String),
	/// Numeric cell.
	Number(f64),
}
impl Cell {
	/// Builds a text cell.
	pub fn text(value: impl Into<String>) -> Self {
		Self::Text(value.into())
	}

	/// Builds a numeric cell.
	pub fn number(value: impl Into<f64>) -> Self {
		Self::Number(value.into())
	}
}

/// Binary workbook writer contract.
///
/// Implementations receive the complete logical model and return the encoded document
/// bytes; they must not perform I/O beyond the encoding itself.
pub trait SheetEncoder
where
	Self: Send + Sync,
{
	/// Encodes the workbook into the target binary format.
	fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>, RenderError>;
}

/// Lowers the itinerary into the logical workbook model.
///
/// One row per day on the Schedule sheet, the lodging section on its own Hotels sheet, and
/// a small Overview sheet carrying the trip header.
pub fn build_workbook(itinerary: &Itinerary) -> Workbook {
	let overview = Sheet {
		name: "Overview".into(),
		rows: vec![
			Row::data([Cell::text("Client"), Cell::text(&itinerary.client_name)]),
			Row::data([
				Cell::text("Travel window"),
				Cell::text(format!("{} to {}", itinerary.start, itinerary.end)),
			]),
			Row::data([Cell::text("Travelers"), Cell::number(itinerary.head_count)]),
		],
	};
	let mut schedule_rows = vec![Row::header([
		"Date",
		"Title",
		"Morning",
		"Afternoon",
		"Evening",
		"Lunch",
		"Dinner",
	])];

	for day in &itinerary.days {
		schedule_rows.push(Row::data([
			Cell::text(short_date(day.date)),
			Cell::text(&day.title),
			Cell::text(&day.morning),
			Cell::text(&day.afternoon),
			Cell::text(&day.evening),
			Cell::text(day.lunch.as_deref().unwrap_or("")),
			Cell::text(day.dinner.as_deref().unwrap_or("")),
		]));
	}

	let mut hotel_rows =
		vec![Row::header(["Group", "Hotel", "Check-in", "Check-out", "Nights", "Note"])];

	for booking in &itinerary.hotels {
		hotel_rows.push(Row::data([
			Cell::text(&booking.group),
			Cell::text(&booking.hotel),
			Cell::text(short_date(booking.check_in)),
			Cell::text(short_date(booking.check_out)),
			Cell::number(booking.nights() as f64),
			Cell::text(booking.note.as_deref().unwrap_or("")),
		]));
	}

	Workbook {
		sheets: vec![
			overview,
			Sheet { name: "Schedule".into(), rows: schedule_rows },
			Sheet { name: "Hotels".into(), rows: hotel_rows },
		],
	}
}

/// Built-in encoder emitting SpreadsheetML 2003 (the XML dialect Excel opens as `.xls`).
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlSheetEncoder;
impl SheetEncoder for XmlSheetEncoder {
	fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>, RenderError> {
		let mut out = String::from(
			"<?xml version=\"1.0\"?>\n\
			<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"\n\
			 xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n\
			 <Styles><Style ss:ID=\"hd\"><Font ss:Bold=\"1\"/></Style></Styles>\n",
		);

		for sheet in &workbook.sheets {
			out.push_str(&format!(
				" <Worksheet ss:Name=\"{}\">\n  <Table>\n",
				xml_escape(&sheet.name),
			));

			for row in &sheet.rows {
				out.push_str("   <Row>");

				for cell in &row.cells {
					let style = if row.header { " ss:StyleID=\"hd\"" } else { "" };

					match cell {
						Cell::Text(text) => out.push_str(&format!(
							"<Cell{style}><Data ss:Type=\"String\">{}</Data></Cell>",
							xml_escape(text),
						)),
						Cell::Number(number) => out.push_str(&format!(
							"<Cell{style}><Data ss:Type=\"Number\">{number}</Data></Cell>",
						)),
					}
				}

				out.push_str("</Row>\n");
			}

			out.push_str("  </Table>\n </Worksheet>\n");
		}

		out.push_str("</Workbook>\n");

		Ok(out.into_bytes())
	}
}

fn xml_escape(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());

	for c in value.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			_ => escaped.push(c),
		}
	}

	escaped
}
