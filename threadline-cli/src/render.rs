use std::borrow::Cow;
use std::cmp::Ordering;
use std::io::Write;
use std::ops::Range;

use chrono::{DateTime, Utc};

use threadline::compose::Target;
use threadline::models::NodeId;
use threadline::policy;
use threadline::time::format_time_ago;
use threadline::tree::NodeRef;
use threadline::vote::VoteState;
use threadline::Discussion;

use crate::{
    app::{State, NODE_HEIGHT},
    error::Error,
    text::Fancy,
    theme::{Colour, Theme},
    util,
};

pub type Line = Vec<Fancy>;
pub type Lines = Vec<Line>;

const INDENT: &str = "  ";

/// Everything a node needs to be drawn, besides the node itself
pub struct Context<'a, V> {
    pub discussion: &'a Discussion,
    pub votes: V,
    pub theme: &'a Theme,
    pub now: DateTime<Utc>,
}

/// Lines for the visible part of the thread, with the current node highlighted
pub fn render_thread<V>(state: &mut State, ctx: &Context<'_, V>, height: usize) -> Lines
where
    V: Fn(&NodeId) -> VoteState,
{
    let lines = render_nodes(state, ctx, Some(state.current_node_index()));
    limit_lines(state, lines, height)
}

/// Lines for the whole thread without a cursor
pub fn render_nodes<V>(state: &State, ctx: &Context<'_, V>, cursor: Option<usize>) -> Lines
where
    V: Fn(&NodeId) -> VoteState,
{
    let digits = state.max_score_digits(ctx.discussion);
    let mut lines = Vec::with_capacity(state.nodes().len() * NODE_HEIGHT);

    for (i, target) in state.nodes().iter().enumerate() {
        let rendered = match target {
            Target::Thread => render_root(ctx, digits),
            Target::Reply(id) => match render_reply(ctx, id, digits) {
                Some(rendered) => rendered,
                None => continue,
            },
        };

        if cursor == Some(i) {
            lines.extend(
                rendered
                    .into_iter()
                    .map(|line| highlight_line(line, ctx.theme.cursor)),
            );
        } else {
            lines.extend(rendered);
        }
    }

    lines
}

fn render_root<V>(ctx: &Context<'_, V>, digits: usize) -> Lines
where
    V: Fn(&NodeId) -> VoteState,
{
    let thread = &ctx.discussion.thread;
    let theme = ctx.theme;

    let mut line1 = Line::new();
    line1.push(Fancy::new(format!("{:1$}", thread.votes, digits)).fg(theme.score));
    line1.extend(vote_marker((ctx.votes)(&thread.id), theme));
    line1.push(Fancy::new(format!(" {}", thread.title)).fg(theme.title).bold());

    let n = ctx.discussion.counts.total();
    let meta = format!(
        "{:pad$} by {author} {when} | {n} comment{s}",
        " ",
        pad = digits,
        author = thread.author,
        when = format_time_ago(&thread.created_at, ctx.now),
        n = n,
        s = if n == 1 { "" } else { "s" },
    );
    let line2 = vec![Fancy::new(meta).fg(theme.byline)];

    vec![line1, line2]
}

fn render_reply<V>(ctx: &Context<'_, V>, id: &NodeId, digits: usize) -> Option<Lines>
where
    V: Fn(&NodeId) -> VoteState,
{
    let node = ctx.discussion.tree.get(id)?;
    let theme = ctx.theme;
    let indent = INDENT.repeat(node.depth.saturating_sub(1));

    let mut line1 = Line::new();
    let score = format!("{}{:width$}", indent, node.votes, width = digits);
    line1.push(Fancy::new(score).fg(theme.score));
    line1.extend(vote_marker((ctx.votes)(id), theme));
    line1.push(Fancy::new(format!(" {}", node.author)).fg(theme.author).bold());

    let n = ctx.discussion.counts.get(NodeRef::Reply(id));
    let mut meta = format!(" {}", format_time_ago(&node.created_at, ctx.now));
    if n > 0 {
        meta.push_str(&format!(" | {} repl{}", n, if n == 1 { "y" } else { "ies" }));
    }
    line1.push(Fancy::new(meta).fg(theme.byline));
    if !policy::can_reply_at(node.depth) {
        line1.push(Fancy::new(" | max depth").fg(theme.max_depth).italic());
    }

    let body = format!(
        "{}{:width$} {}",
        indent,
        " ",
        util::one_line(&node.body),
        width = digits
    );
    let line2 = vec![Fancy::new(body).fg(theme.body)];

    Some(vec![line1, line2])
}

fn vote_marker(state: VoteState, theme: &Theme) -> Option<Fancy> {
    match state {
        VoteState::None => None,
        VoteState::Up => Some(Fancy::new(" ▲").fg(theme.vote_up)),
        VoteState::Down => Some(Fancy::new(" ▼").fg(theme.vote_down)),
    }
}

pub fn highlight_line(line: Line, colour: Colour) -> Line {
    line.into_iter().map(|span| span.bg(colour)).collect()
}

trait Encompass<T> {
    fn encompass(&self, other: &Range<T>) -> Ordering
    where
        T: PartialOrd<T>;
}

impl<T> Encompass<T> for Range<T> {
    fn encompass(&self, other: &Range<T>) -> Ordering
    where
        T: PartialOrd<T>,
    {
        if other.start < self.start {
            Ordering::Less
        } else if other.end > self.end {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Work out the range of lines to render, ensuring the current node is visible
pub fn limit_lines(state: &mut State, lines: Lines, height: usize) -> Lines {
    let node_range = state.node_range();
    let ordering = state.visible_range(height).encompass(&node_range);
    let row_offset = state.row_offset_get_mut();

    match ordering {
        Ordering::Less => *row_offset = node_range.start,
        Ordering::Equal => (),
        Ordering::Greater => *row_offset = node_range.end.saturating_sub(height),
    }

    lines.into_iter().skip(*row_offset).take(height).collect()
}

/// Render the lines with offset (x, y), filling the terminal row by row
pub fn render_lines<W: Write>(
    lines: &[Line],
    screen: &mut W,
    col_offset: usize,
    width: usize,
) -> Result<(), Error> {
    let empty_line = " ".repeat(width);

    write!(screen, "{}", termion::cursor::Goto(1, 1))?;

    // Limit the lines to the width of the terminal
    let scoped_lines = lines.iter().map(|line| {
        let mut cols_remaining = col_offset;

        line.iter().filter_map(move |span| {
            if cols_remaining == 0 {
                return Some(Cow::Borrowed(span));
            }
            let span_cols = span.cols();
            if span_cols <= cols_remaining {
                cols_remaining -= span_cols;
                None
            } else {
                let span = span.truncate_front(cols_remaining);
                cols_remaining = 0;
                Some(Cow::Owned(span))
            }
        })
    });

    for (row, line) in scoped_lines.enumerate() {
        let mut col: usize = 0;

        if row != 0 {
            write!(screen, "\r\n")?;
        }

        let mut last_span = None;
        for span in line {
            let span_cols = span.cols();

            if col + span_cols <= width {
                write!(screen, "{}", span)?;
                col += span_cols;
                last_span = Some(span);
            } else {
                let truncated = span.truncate(width - col);
                write!(screen, "{}", truncated)?;
                col += truncated.cols();
                last_span = Some(Cow::Owned(truncated));
                break;
            }
        }

        // Erase the rest of the line
        // This is done in favor of ClearAll to reduce flicker
        if col < width {
            let blank = &empty_line[..width - col];
            match last_span.and_then(|span| span.get_bg()) {
                Some(bg) => write!(screen, "{}", Fancy::new(blank).bg(bg))?,
                None => screen.write_all(blank.as_bytes())?,
            }
        }
    }

    screen.flush().map_err(Error::from)
}

/// Write lines to a plain stream, one per row
pub fn print_lines<W: Write>(lines: &[Line], out: &mut W) -> Result<(), Error> {
    for line in lines {
        for span in line {
            write!(out, "{}", span)?;
        }
        writeln!(out)?;
    }

    out.flush().map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::THREADLINE_MONO;
    use chrono::TimeZone;
    use serde_json::json;
    use threadline::models::ThreadPayload;

    fn discussion() -> Discussion {
        let payload = ThreadPayload {
            thread: Some(json!({
                "id": 7,
                "title": "Best shoegaze record",
                "username": "ana",
                "createdAt": "2024-03-10T10:00:00Z",
                "upvotes": 12,
            })),
            replies: json!([
                { "id": 1, "content": "Loveless", "author": "ben", "upvotes": 4,
                  "createdAt": "2024-03-10T11:55:00Z" },
                { "id": 2, "parent_reply_id": 1, "content": "obviously", "upvotes": 1 },
                { "id": 3, "parent_reply_id": 2, "content": "too\nobvious", "upvotes": 0 },
            ]),
        };
        Discussion::from_payload(&NodeId::from("7"), &payload).unwrap()
    }

    fn text(line: &Line) -> String {
        line.iter().map(|span| span.text()).collect()
    }

    fn context(discussion: &Discussion) -> Context<'_, impl Fn(&NodeId) -> VoteState> {
        Context {
            discussion,
            votes: |id: &NodeId| {
                if id.as_str() == "1" {
                    VoteState::Up
                } else {
                    VoteState::None
                }
            },
            theme: &THREADLINE_MONO,
            now: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_nodes() {
        let discussion = discussion();
        let state = State::new(&discussion);
        let lines = render_nodes(&state, &context(&discussion), None);
        let lines: Vec<_> = lines.iter().map(text).collect();

        assert_eq!(
            lines,
            vec![
                "12 Best shoegaze record",
                "   by ana 2 hours ago | 3 comments",
                " 4 ▲ ben 5 mins ago | 2 replies",
                "   Loveless",
                "   1 Unknown Just now | 1 reply",
                "     obviously",
                "     0 Unknown Just now | max depth",
                "       too obvious",
            ]
        );
    }

    #[test]
    fn test_cursor_is_highlighted() {
        let discussion = discussion();
        let mut state = State::new(&discussion);
        state.next_node();
        let lines = render_thread(&mut state, &context(&discussion), 100);

        assert!(lines[0].iter().all(|span| span.get_bg().is_none()));
        assert!(lines[2]
            .iter()
            .all(|span| span.get_bg() == Some(THREADLINE_MONO.cursor)));
        assert!(lines[3]
            .iter()
            .all(|span| span.get_bg() == Some(THREADLINE_MONO.cursor)));
    }

    #[test]
    fn test_limit_lines_follows_cursor() {
        let discussion = discussion();
        let mut state = State::new(&discussion);
        state.next_node();
        state.next_node();
        state.next_node();

        let lines = render_thread(&mut state, &context(&discussion), 4);
        assert_eq!(lines.len(), 4);
        assert_eq!(text(&lines[3]), "       too obvious");

        state.prev_node();
        state.prev_node();
        state.prev_node();
        let lines = render_thread(&mut state, &context(&discussion), 4);
        assert_eq!(text(&lines[0]), "12 Best shoegaze record");
    }

    #[test]
    fn test_render_lines_pads_and_truncates() {
        let lines = vec![
            vec![Fancy::new("hello "), Fancy::new("world")],
            vec![Fancy::new("hi")],
        ];
        let mut out = Vec::new();
        render_lines(&lines, &mut out, 0, 8).unwrap();

        let expected = format!("{}hello wo\r\nhi      ", termion::cursor::Goto(1, 1));
        assert_eq!(String::from_utf8(out).unwrap(), expected);

        let mut out = Vec::new();
        render_lines(&lines, &mut out, 7, 8).unwrap();
        let expected = format!("{}orld    \r\n        ", termion::cursor::Goto(1, 1));
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
