// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::frame::{GRID_SIZE, Matrix};

const FIELD_SEPARATOR: char = ',';

/// Result of parsing one pressure file.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub frames: Vec<Matrix>,
    /// Fields that were missing, unparsable or non-finite and read as 0.0.
    pub malformed_cells: usize,
    /// Lines after the last complete frame.
    pub dropped_lines: usize,
}

/// Splits `text` into frames of 32 lines, each line holding 32
/// comma-separated readings.
///
/// Never fails: bad fields become 0.0, short rows are zero-padded, extra
/// fields are ignored and an incomplete trailing block is dropped.
pub fn parse(text: &str) -> ParsedFile {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines = split_lines(text);

    let mut malformed_cells = 0;
    let blocks = lines.chunks_exact(GRID_SIZE);
    let dropped_lines = blocks.remainder().len();

    let frames = blocks
        .map(|block| parse_block(block, &mut malformed_cells))
        .collect();

    ParsedFile {
        frames,
        malformed_cells,
        dropped_lines,
    }
}

/// Splits on `\r\n`, `\n` or a lone `\r`. A terminator at the very end does
/// not start another line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(end) = rest.find(['\r', '\n']) else {
            lines.push(rest);
            break;
        };
        let (line, tail) = rest.split_at(end);
        lines.push(line);
        rest = tail
            .strip_prefix("\r\n")
            .or_else(|| tail.get(1..))
            .unwrap_or_default();
    }

    lines
}

fn parse_block(block: &[&str], malformed_cells: &mut usize) -> Matrix {
    let mut matrix = Matrix::zeroed();

    for (row, line) in block.iter().enumerate() {
        let Some(cells) = matrix.row_mut(row) else {
            break;
        };

        let mut fields = line.split(FIELD_SEPARATOR);
        for cell in cells.iter_mut() {
            match fields.next().and_then(parse_cell) {
                Some(value) => *cell = value,
                None => *malformed_cells += 1,
            }
        }
    }

    matrix
}

fn parse_cell(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
