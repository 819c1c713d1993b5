use crate::council::*;

const CELL_WIDTH: usize = 5;

fn format_score(s: &Similarity) -> String {
    match s.value() {
        Some(v) => format!("{:>width$}", format!("{:.0}%", v * 100.0), width = CELL_WIDTH),
        None => format!("{:>width$}", "--", width = CELL_WIDTH),
    }
}

/// Prints the lower triangle of a layout. Rows are numbered, and the columns
/// follow the numbering of the rows.
pub fn format_layout(layout: &Layout) -> String {
    let reference = match layout.reference.as_deref() {
        Some(r) => r,
        None => return "No councillor to display\n".to_string(),
    };
    let num_width = layout.order.len().to_string().len();
    let name_width = layout.order.iter().map(|n| n.chars().count()).max().unwrap_or(0);

    let mut out = format!("Similarity to {}\n", reference);
    for (row, name) in layout.order.iter().enumerate() {
        let padding = name_width - name.chars().count();
        out.push_str(&format!(
            "{:>nw$} {}{}",
            row + 1,
            name,
            " ".repeat(padding),
            nw = num_width
        ));
        for cell in layout.masked[row].iter().flatten() {
            out.push_str(&format_score(cell));
        }
        out.push('\n');
    }
    out.push_str(&" ".repeat(num_width + 1 + name_width));
    for col in 1..layout.order.len() {
        out.push_str(&format!("{:>width$}", col, width = CELL_WIDTH));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_triangle() {
        let m = SimilarityMatrix::from_parts(
            vec!["Mayor".to_string(), "Ally".to_string(), "Newcomer".to_string()],
            vec![
                vec![
                    Similarity::Undefined,
                    Similarity::from_counts(9, 10),
                    Similarity::Undefined,
                ],
                vec![
                    Similarity::from_counts(9, 10),
                    Similarity::Undefined,
                    Similarity::from_counts(1, 3),
                ],
                vec![
                    Similarity::Undefined,
                    Similarity::from_counts(1, 3),
                    Similarity::Undefined,
                ],
            ],
        )
        .unwrap();
        let l = layout(
            &m,
            &VacancyMetadata::new(),
            &LayoutRequest {
                reference: Some("Mayor".to_string()),
                include: IncludeFlags::default(),
                anchors: vec![],
            },
        );
        let text = format_layout(&l);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Similarity to Mayor");
        assert_eq!(lines[1], "1 Mayor   ");
        assert_eq!(lines[2], "2 Ally      90%");
        assert_eq!(lines[3], "3 Newcomer   --  33%");
        assert_eq!(lines[4], "              1    2");
    }

    #[test]
    fn empty_layout() {
        assert_eq!(format_layout(&Layout::default()), "No councillor to display\n");
    }
}
