use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use unicode_width::UnicodeWidthStr;

use rosterview::domain::TVConfig;
use rosterview::pagination::Pagination;
use rosterview::render::{Body, RenderedView};

use crate::model::{Model, UIData};

pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const SEARCHLINE_HEIGHT: u16 = 1;
pub const FILTERLINE_HEIGHT: u16 = 1;
pub const PAGINATION_HEIGHT: u16 = 1;

pub struct TableUI {
    max_column_width: usize,
}

impl TableUI {
    pub fn new(cfg: &TVConfig) -> Self {
        Self {
            max_column_width: cfg.max_column_width,
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [search_area, filter_area, table_area, pagination_area, status_area] =
            Layout::vertical([
                Constraint::Length(SEARCHLINE_HEIGHT),
                Constraint::Length(FILTERLINE_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(PAGINATION_HEIGHT),
                Constraint::Length(STATUSLINE_HEIGHT),
            ])
            .areas(frame.area());

        self.draw_search(uidata, frame, search_area);
        frame.render_widget(Paragraph::new(filter_line(&uidata.view)), filter_area);
        self.draw_table(uidata, frame, table_area);
        frame.render_widget(
            Paragraph::new(pagination_line(
                uidata.view.pagination.as_ref(),
                uidata.view.total_results,
            )),
            pagination_area,
        );
        frame.render_widget(
            Paragraph::new(uidata.status_message.as_str()).style(Style::new().dim()),
            status_area,
        );

        if uidata.show_popup {
            self.draw_popup(uidata, frame);
        }
    }

    fn draw_search(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let prefix = format!(" {} │ ", uidata.name);
        let search = &uidata.view.search;
        let text = if uidata.searching {
            Span::raw(uidata.cmdinput.input.clone()).yellow()
        } else if search.query.is_empty() {
            Span::raw(search.placeholder.clone()).dim()
        } else {
            Span::raw(search.query.clone())
        };
        let line = Line::from(vec![Span::raw(prefix.clone()).bold(), "/ ".blue(), text]);
        frame.render_widget(Paragraph::new(line), area);

        if uidata.searching {
            let before: String = uidata
                .cmdinput
                .input
                .chars()
                .take(uidata.cmdinput.cursor_pos)
                .collect();
            let x = area.x + (prefix.width() + 2 + before.width()) as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        }
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let view = &uidata.view;
        let widths = self.column_widths(view);

        let header = Row::new(view.headers.iter().enumerate().map(|(idx, h)| {
            let mut label = h.label.clone();
            if let Some(direction) = h.direction {
                label.push(' ');
                label.push_str(direction.arrow());
            } else if h.sortable {
                label.push_str(" ·");
            }
            let mut style = Style::new().bold().underlined();
            if idx == uidata.selected_column {
                style = style.fg(Color::Yellow);
            }
            Cell::from(label).style(style)
        }));

        let (rows, selected): (Vec<Row>, Option<usize>) = match &view.body {
            Body::Rows(rows) => (
                rows.iter()
                    .map(|r| {
                        Row::new(r.cells.iter().enumerate().map(|(idx, c)| {
                            let cell = Cell::from(c.clone());
                            if idx == uidata.selected_column {
                                cell.style(Style::new().add_modifier(Modifier::BOLD))
                            } else {
                                cell
                            }
                        }))
                    })
                    .collect(),
                Some(uidata.selected_row),
            ),
            Body::Empty { message, .. } => (
                vec![Row::new(vec![Cell::from(message.clone()).italic().dim()])],
                None,
            ),
        };

        // The empty row spans the whole width.
        let constraints = if view.body.is_empty() {
            vec![Constraint::Fill(1)]
        } else {
            widths
        };

        let table = Table::new(rows, constraints)
            .header(header)
            .block(Block::bordered())
            .column_spacing(1)
            .row_highlight_style(Style::new().reversed());
        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn column_widths(&self, view: &RenderedView) -> Vec<Constraint> {
        view.headers
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                let header = h.label.width() + 2;
                let cells = view
                    .body
                    .rows()
                    .iter()
                    .filter_map(|r| r.cells.get(idx))
                    .map(|c| c.width())
                    .max()
                    .unwrap_or(0);
                let width = std::cmp::max(header, cells) + COLUMN_WIDTH_MARGIN;
                Constraint::Length(std::cmp::min(width, self.max_column_width) as u16)
            })
            .collect()
    }

    fn draw_popup(&self, uidata: &UIData, frame: &mut Frame) {
        let area = popup_area(frame.area(), 60, 70);
        let popup = Paragraph::new(uidata.popup_message.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(" Help ".bold()));
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

fn filter_line(view: &RenderedView) -> Line<'static> {
    if view.filters.is_empty() {
        return Line::from(" no filters".dim());
    }
    let mut spans = Vec::new();
    for (idx, f) in view.filters.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        let selected = f.selected.value().unwrap_or("all").to_string();
        spans.push(Span::raw(format!(" {}: ", f.header)));
        let choice = Span::raw(format!("[{selected}]"));
        spans.push(if f.selected.value().is_some() {
            choice.green().bold()
        } else {
            choice.dim()
        });
        spans.push(Span::raw(format!(" ({})", f.options.len() - 1)).dim());
    }
    Line::from(spans)
}

fn pagination_line(pagination: Option<&Pagination>, total_results: usize) -> Line<'static> {
    let results = Span::raw(format!(" {total_results} results")).dim();
    let Some(p) = pagination else {
        return Line::from(results);
    };
    let mut spans = Vec::new();
    let prev = Span::raw(" ‹ Prev ");
    spans.push(if p.has_previous { prev.blue() } else { prev.dim() });
    for &page in p.pages.iter() {
        let label = Span::raw(format!(" {page} "));
        spans.push(if page == p.current {
            label.reversed()
        } else {
            label
        });
    }
    let next = Span::raw(" Next › ");
    spans.push(if p.has_next { next.blue() } else { next.dim() });
    spans.push(Span::raw(format!(" page {}/{} ·", p.current, p.total)).dim());
    spans.push(results);
    Line::from(spans)
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_line_marks_disabled_ends() {
        let p = Pagination::new(3, 3).unwrap();
        let line = pagination_line(Some(&p), 23);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains(" 1  2  3 "));
        assert!(text.contains("page 3/3"));
        assert!(text.ends_with("23 results"));
    }

    #[test]
    fn single_page_only_shows_count() {
        let line = pagination_line(None, 4);
        assert_eq!(line.spans.len(), 1);
    }
}
