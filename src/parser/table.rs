//! GFM tables: a header row, a delimiter row, then body rows until a blank
//! line or another block starts.

use std::cell::RefCell;
use std::mem;

use smallvec::SmallVec;
use tracing::trace;

use crate::arena_tree::Node;
use crate::nodes::{Ast, AstNode, NodeTable, NodeValue, TableAlignment};
use crate::parser::Parser;
use crate::scanners;
use crate::strings::trim;

// Wider tables are left as paragraphs.
const MAX_COLUMNS: usize = u16::MAX as usize;

// Once this many empty cells have been made up to pad short rows, the table
// ends.
const MAX_AUTOCOMPLETED_CELLS: usize = 500_000;

type Cells = SmallVec<[String; 8]>;

struct Row {
    cells: Cells,
    has_pipe: bool,
}

/// Opens a table when `container` is a paragraph whose last line is a
/// header row and `line` the delimiter row below it, or adds a body row when
/// `container` is already a table.  Returns the table on success.
pub fn try_opening_block<'a, 'o>(
    parser: &mut Parser<'a, 'o>,
    container: &'a AstNode<'a>,
    line: &str,
) -> Option<&'a AstNode<'a>> {
    let columns = match container.data.borrow().value {
        NodeValue::Paragraph => None,
        NodeValue::Table(ref nt) => Some(nt.alignments.len()),
        _ => return None,
    };

    match columns {
        None => try_opening_header(parser, container, line),
        Some(columns) => try_opening_row(parser, container, columns, line),
    }
}

fn try_opening_header<'a, 'o>(
    parser: &mut Parser<'a, 'o>,
    container: &'a AstNode<'a>,
    line: &str,
) -> Option<&'a AstNode<'a>> {
    let marker_row = row(&line[parser.first_nonspace..])?;
    if !marker_row
        .cells
        .iter()
        .all(|cell| scanners::table_delimiter_cell(cell.as_bytes()))
    {
        return None;
    }

    let mut content = mem::take(&mut container.data.borrow_mut().content);
    let opened = open_table(parser, container, line, &mut content, &marker_row);
    if opened.is_none() {
        container.data.borrow_mut().content = content;
    }
    opened
}

fn open_table<'a, 'o>(
    parser: &mut Parser<'a, 'o>,
    container: &'a AstNode<'a>,
    line: &str,
    content: &mut String,
    marker_row: &Row,
) -> Option<&'a AstNode<'a>> {
    // Definitions in front of the header are not part of it.
    if !parser.resolve_reference_link_definitions(content) {
        return None;
    }

    let body = content.trim_end_matches(['\r', '\n']);
    let header_start = body.rfind('\n').map_or(0, |nl| nl + 1);
    let header_row = row(&body[header_start..])?;

    if header_row.cells.len() != marker_row.cells.len()
        || header_row.cells.len() > MAX_COLUMNS
        || !(header_row.has_pipe || marker_row.has_pipe)
    {
        return None;
    }

    let alignments: Vec<TableAlignment> = marker_row
        .cells
        .iter()
        .map(|cell| alignment(cell))
        .collect();

    let header_line = parser.line_number - 1;
    let start_column = container.data.borrow().sourcepos.start.column;

    let columns = header_row.cells.len();
    let table = parser.arena.alloc(Node::new(RefCell::new(Ast::new(
        NodeValue::Table(NodeTable {
            alignments,
            num_rows: 0,
        }),
        (header_line, start_column).into(),
    ))));
    container.insert_after(table);

    if header_start == 0 {
        container.detach();
    } else {
        content.truncate(header_start);
        let remaining = mem::take(content);
        let last_len = remaining
            .trim_end_matches(['\r', '\n'])
            .rsplit('\n')
            .next()
            .map_or(0, str::len);
        container.data.borrow_mut().content = remaining;
        parser.finalize(container);
        container.data.borrow_mut().sourcepos.end =
            (header_line - 1, start_column + last_len.saturating_sub(1)).into();
    }

    // The paragraph is gone or closed; the table takes over as the open tip.
    parser.current = table;
    parser.table_autocompleted_cells = 0;
    trace!(columns, line = header_line, "opened table");

    add_row(parser, table, true, header_row.cells, columns);
    let offset = line.len() - 1 - parser.offset;
    parser.advance_offset(line, offset, false);

    Some(table)
}

fn try_opening_row<'a, 'o>(
    parser: &mut Parser<'a, 'o>,
    container: &'a AstNode<'a>,
    columns: usize,
    line: &str,
) -> Option<&'a AstNode<'a>> {
    if parser.blank {
        return None;
    }
    let this_row = row(&line[parser.first_nonspace..])?;

    let missing = columns.saturating_sub(this_row.cells.len());
    parser.table_autocompleted_cells += missing;
    if parser.table_autocompleted_cells > MAX_AUTOCOMPLETED_CELLS {
        trace!(line = parser.line_number, "too many padded cells; ending table");
        return None;
    }

    add_row(parser, container, false, this_row.cells, columns);
    let offset = line.len() - 1 - parser.offset;
    parser.advance_offset(line, offset, false);

    Some(container)
}

// Appends a closed row of exactly `columns` cells, padding with empty ones
// or dropping extras, and stretches the table to cover it.
fn add_row<'a, 'o>(
    parser: &mut Parser<'a, 'o>,
    table: &'a AstNode<'a>,
    header: bool,
    cells: Cells,
    columns: usize,
) {
    let (line_number, start_column, end_column) = if header {
        (
            parser.line_number - 1,
            table.data.borrow().sourcepos.start.column,
            parser.last_line_length,
        )
    } else {
        (
            parser.line_number,
            parser.first_nonspace + 1,
            parser.curline_end_col,
        )
    };
    let sourcepos = (line_number, start_column, line_number, end_column).into();

    let new_row = parser.add_child(table, NodeValue::TableRow(header), start_column);
    {
        let mut ast = new_row.data.borrow_mut();
        ast.sourcepos = sourcepos;
        ast.open = false;
    }

    let mut cells = cells.into_iter();
    for _ in 0..columns {
        let cell = parser.add_child(new_row, NodeValue::TableCell, start_column);
        let mut ast = cell.data.borrow_mut();
        ast.content = cells.next().unwrap_or_default();
        ast.sourcepos = sourcepos;
        ast.open = false;
    }

    let mut ast = table.data.borrow_mut();
    if let NodeValue::Table(ref mut nt) = ast.value {
        nt.num_rows += 1;
    }
    ast.sourcepos.end = (parser.line_number, parser.curline_end_col).into();
}

fn alignment(cell: &str) -> TableAlignment {
    let left = cell.starts_with(':');
    let right = cell.ends_with(':');
    match (left, right) {
        (true, true) => TableAlignment::Center,
        (true, false) => TableAlignment::Left,
        (false, true) => TableAlignment::Right,
        (false, false) => TableAlignment::None,
    }
}

/// Splits a line into trimmed cells on unescaped pipes.  Leading and
/// trailing pipes are optional.  A blank line is not a row.
fn row(line: &str) -> Option<Row> {
    let line = trim(line);
    let bytes = line.as_bytes();
    if bytes.is_empty() {
        return None;
    }

    let mut cells = Cells::new();
    let mut has_pipe = false;
    let mut i = 0;
    if bytes[0] == b'|' {
        has_pipe = true;
        i = 1;
    }

    let mut cell_start = i;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => {
                has_pipe = true;
                cells.push(unescape_pipes(trim(&line[cell_start..i])));
                i += 1;
                cell_start = i;
            }
            _ => i += 1,
        }
    }
    if cell_start < bytes.len() {
        cells.push(unescape_pipes(trim(&line[cell_start..])));
    }

    if cells.is_empty() {
        None
    } else {
        Some(Row { cells, has_pipe })
    }
}

fn unescape_pipes(cell: &str) -> String {
    cell.replace("\\|", "|")
}

/// Whether `line` can continue a table as a body row.
pub fn matches(line: &str) -> bool {
    row(line).is_some()
}
