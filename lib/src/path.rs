use std::ops::Range;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

/// A command letter followed by everything up to the next command letter
static COMMAND_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[MmLlHhVvCcSsQqTtAaZz][^MmLlHhVvCcSsQqTtAaZz]*")
        .expect("command group regex must compile")
});

/// Signed decimals as emitted by authoring tools, which happily write `10-5.5.5` for `10 -5.5 .5`
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("number regex must compile")
});

/// Path command kinds, named after their [`svgtypes::PathSegment`] counterparts
///
/// <https://www.w3.org/TR/SVG/paths.html#PathDataGeneralInformation>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    MoveTo,
    LineTo,
    HorizontalLineTo,
    VerticalLineTo,
    CurveTo,
    SmoothCurveTo,
    Quadratic,
    SmoothQuadratic,
    EllipticalArc,
    ClosePath,
}

impl CommandKind {
    fn from_letter(letter: char) -> Option<Self> {
        use CommandKind::*;
        Some(match letter.to_ascii_uppercase() {
            'M' => MoveTo,
            'L' => LineTo,
            'H' => HorizontalLineTo,
            'V' => VerticalLineTo,
            'C' => CurveTo,
            'S' => SmoothCurveTo,
            'Q' => Quadratic,
            'T' => SmoothQuadratic,
            'A' => EllipticalArc,
            'Z' => ClosePath,
            _ => return None,
        })
    }

    fn letter(self) -> char {
        use CommandKind::*;
        match self {
            MoveTo => 'M',
            LineTo => 'L',
            HorizontalLineTo => 'H',
            VerticalLineTo => 'V',
            CurveTo => 'C',
            SmoothCurveTo => 'S',
            Quadratic => 'Q',
            SmoothQuadratic => 'T',
            EllipticalArc => 'A',
            ClosePath => 'Z',
        }
    }
}

/// One command group: a command letter and the flat list of operands that followed it
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    /// Uppercase letters are absolute, lowercase ones are relative to the current position
    pub abs: bool,
    pub operands: Vec<f64>,
    /// Byte range of the whole group in the path string
    pub span: Range<usize>,
}

impl Command {
    /// The command letter as it appeared in the path
    pub fn letter(&self) -> char {
        let letter = self.kind.letter();
        if self.abs {
            letter
        } else {
            letter.to_ascii_lowercase()
        }
    }
}

/// Text that was neither a command letter, a number nor a separator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discarded<'a> {
    pub text: &'a str,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathData<'a> {
    pub commands: Vec<Command>,
    pub discarded: Vec<Discarded<'a>>,
}

/// Splits path data into command groups without ever failing.
///
/// Anything that is not a number is dropped from the operand list and recorded
/// in [`PathData::discarded`], so callers can report it if they care.
pub fn tokenize(d: &str) -> PathData<'_> {
    let mut data = PathData::default();
    let mut last_end = 0;

    for group in COMMAND_GROUP.find_iter(d) {
        push_discarded(d, last_end..group.start(), &mut data.discarded);
        last_end = group.end();

        let mut chars = group.as_str().chars();
        let Some(letter) = chars.next() else {
            continue;
        };
        let Some(kind) = CommandKind::from_letter(letter) else {
            continue;
        };

        let body_start = group.start() + letter.len_utf8();
        let body = chars.as_str();
        let mut operands = vec![];
        let mut position = 0;
        while position < body.len() {
            // Arc flags are single characters, so `0150` after the rotation is `0 1 50`
            let flag_slot =
                kind == CommandKind::EllipticalArc && matches!(operands.len() % 7, 3 | 4);
            let rest = body[position..].trim_start_matches(is_separator);
            let start = body.len() - rest.len();
            if flag_slot && (rest.starts_with('0') || rest.starts_with('1')) {
                operands.push(if rest.starts_with('1') { 1. } else { 0. });
                position = start + 1;
                continue;
            }

            let Some(number) = NUMBER.find_at(body, start) else {
                break;
            };
            push_discarded(
                d,
                body_start + start..body_start + number.start(),
                &mut data.discarded,
            );
            position = number.end();
            match number.as_str().parse::<f64>() {
                Ok(value) if value.is_finite() => operands.push(value),
                _ => push_discarded(
                    d,
                    body_start + number.start()..body_start + number.end(),
                    &mut data.discarded,
                ),
            }
        }
        push_discarded(
            d,
            body_start + position.min(body.len())..group.end(),
            &mut data.discarded,
        );

        let command = Command {
            kind,
            abs: letter.is_ascii_uppercase(),
            operands,
            span: group.range(),
        };
        debug!("Tokenized {}{:?}", command.letter(), command.operands);
        data.commands.push(command);
    }
    push_discarded(d, last_end..d.len(), &mut data.discarded);

    data
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn push_discarded<'a>(source: &'a str, range: Range<usize>, discarded: &mut Vec<Discarded<'a>>) {
    let gap = &source[range.clone()];
    let leading = gap.trim_start_matches(is_separator);
    let start = range.start + (gap.len() - leading.len());
    let text = leading.trim_end_matches(is_separator);
    if !text.is_empty() {
        discarded.push(Discarded {
            text,
            span: start..start + text.len(),
        });
    }
}
