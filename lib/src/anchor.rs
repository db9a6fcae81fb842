use log::debug;
use lyon_geom::{point, Box2D, Point};
use svgtypes::{PathParser, PathSegment};

use crate::path::{self, Command, CommandKind, Discarded};
use crate::turtle::{BoundsTurtle, Cursor, Turtle};

/// Everything learned while tracing a path for its label anchor
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate<'a> {
    pub anchor: Point<f64>,
    /// Box around every position the cursor visited
    pub bounding_box: Option<Box2D<f64>>,
    pub last_move: Option<Point<f64>>,
    /// Tokens that were dropped from the path data
    pub discarded: Vec<Discarded<'a>>,
}

/// Approximate center of a path, for placing a text label over it.
///
/// Never fails: malformed path data degrades to a less accurate anchor.
pub fn label_anchor(d: &str) -> Point<f64> {
    estimate(d).anchor
}

pub fn bounding_box(d: &str) -> Option<Box2D<f64>> {
    estimate(d).bounding_box
}

/// Traces leniently tokenized path data.
///
/// Curves and arcs only contribute their final coordinate pair, so the box can
/// be smaller than the rendered shape when control points bulge outward.
pub fn estimate(d: &str) -> Estimate<'_> {
    let path::PathData {
        commands,
        discarded,
    } = path::tokenize(d);

    let mut cursor = Cursor::new(BoundsTurtle::default());
    commands
        .iter()
        .for_each(|command| apply_command(&mut cursor, command));

    finish(cursor, discarded)
}

/// Same as [`estimate`], but rejects anything the SVG path grammar does not allow
pub fn strict_estimate(d: &str) -> Result<Estimate<'_>, svgtypes::Error> {
    let mut cursor = Cursor::new(BoundsTurtle::default());
    for segment in PathParser::from(d) {
        apply_segment(&mut cursor, segment?);
    }
    Ok(finish(cursor, vec![]))
}

pub fn strict_label_anchor(d: &str) -> Result<Point<f64>, svgtypes::Error> {
    strict_estimate(d).map(|estimate| estimate.anchor)
}

fn finish(cursor: Cursor<BoundsTurtle>, discarded: Vec<Discarded<'_>>) -> Estimate<'_> {
    let bounding_box = cursor.turtle.bounding_box;
    let last_move = cursor.last_move();
    Estimate {
        anchor: bounding_box
            .map(|Box2D { min, max }| point(min.x / 2. + max.x / 2., min.y / 2. + max.y / 2.))
            .or(last_move)
            .unwrap_or_else(Point::origin),
        bounding_box,
        last_move,
        discarded,
    }
}

/// Maps one command group onto the cursor
pub fn apply_command<T: Turtle>(cursor: &mut Cursor<T>, command: &Command) {
    use CommandKind::*;

    debug!("Tracing {}{:?}", command.letter(), command.operands);
    let abs = command.abs;
    let operands = command.operands.as_slice();
    match command.kind {
        MoveTo => {
            let mut pairs = operands.chunks_exact(2);
            if let Some(&[x, y]) = pairs.next() {
                cursor.move_to(abs, x, y);
            }
            // Extra pairs after a moveto are implicit linetos
            pairs.for_each(|pair| cursor.line(abs, pair[0], pair[1]));
        }
        LineTo => operands
            .chunks_exact(2)
            .for_each(|pair| cursor.line(abs, pair[0], pair[1])),
        HorizontalLineTo => operands.iter().for_each(|&x| cursor.line(abs, x, None)),
        VerticalLineTo => operands.iter().for_each(|&y| cursor.line(abs, None, y)),
        CurveTo | SmoothCurveTo | Quadratic | SmoothQuadratic | EllipticalArc => {
            if let &[.., x, y] = operands {
                cursor.curve(abs, point(x, y));
            }
        }
        ClosePath => cursor.close(),
    }
}

/// Maps a strictly parsed [`PathSegment`] onto the cursor
pub fn apply_segment<T: Turtle>(cursor: &mut Cursor<T>, segment: PathSegment) {
    use PathSegment::*;

    debug!("Tracing {:?}", &segment);
    match segment {
        MoveTo { abs, x, y } => cursor.move_to(abs, x, y),
        LineTo { abs, x, y } => cursor.line(abs, x, y),
        HorizontalLineTo { abs, x } => cursor.line(abs, x, None),
        VerticalLineTo { abs, y } => cursor.line(abs, None, y),
        CurveTo { abs, x, y, .. }
        | SmoothCurveTo { abs, x, y, .. }
        | Quadratic { abs, x, y, .. }
        | SmoothQuadratic { abs, x, y }
        | EllipticalArc { abs, x, y, .. } => cursor.curve(abs, point(x, y)),
        // abs has no effect on closepath
        ClosePath { abs: _ } => cursor.close(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_path_anchors_at_origin() {
        assert_eq!(label_anchor(""), point(0., 0.));
        assert_eq!(bounding_box(""), None);
    }

    #[test]
    fn lone_moveto_anchors_at_that_point() {
        for (x, y) in [(0., 0.), (12.5, -3.), (-100., 7e3)] {
            let d = format!("M {x} {y}");
            assert_eq!(label_anchor(&d), point(x, y), "{d}");
            assert_eq!(label_anchor(&format!("m{x},{y}")), point(x, y));
        }
    }

    #[test]
    fn square_anchors_at_its_center() {
        assert_eq!(label_anchor("M 0 0 L 10 0 L 10 10 L 0 10 Z"), point(5., 5.));
    }

    #[test]
    fn relative_and_absolute_paths_share_a_box() {
        assert_eq!(
            bounding_box("m 0 0 l 10 0 l 0 10"),
            bounding_box("M 0 0 L 10 0 L 10 10")
        );
        assert_eq!(
            bounding_box("m 3 4 h 5 v -2 h -10 z"),
            bounding_box("M 3 4 H 8 V 2 H -2 Z")
        );
    }

    #[test]
    fn curves_ignore_control_points() {
        assert_eq!(label_anchor("M 0 0 C 100 100 100 100 0 0"), point(0., 0.));
        assert_eq!(label_anchor("M 0 0 Q 50 -80 20 0"), point(10., 0.));
        assert_eq!(label_anchor("M 0 0 a 25 25 0 0 1 50 50"), point(25., 25.));
    }

    #[test]
    fn curve_groups_only_use_their_final_pair() {
        // Two implicit cubic segments; only the last end point moves the cursor
        assert_eq!(
            bounding_box("M0 0c1 1 2 2 100 100 1 1 2 2 10 0"),
            Some(Box2D::new(point(0., 0.), point(10., 0.)))
        );
    }

    #[test]
    fn implicit_linetos_after_moveto() {
        assert_eq!(label_anchor("M 0 0 20 0 20 20"), point(10., 10.));
        assert_eq!(label_anchor("m 10 10 10 0 0 10"), point(15., 15.));
    }

    #[test]
    fn unpaired_and_short_operands_are_ignored() {
        assert_eq!(label_anchor("M 0 0 L 10 10 5"), point(5., 5.));
        assert_eq!(label_anchor("M 2 2 C 5"), point(2., 2.));
        assert_eq!(label_anchor("M 4"), point(0., 0.));
    }

    #[test]
    fn malformed_tokens_degrade_gracefully() {
        let estimate = estimate("M 0 0 L 10 #? 10 Z");
        assert_eq!(estimate.anchor, point(5., 5.));
        assert_eq!(estimate.discarded.len(), 1);
        assert_eq!(estimate.discarded[0].text, "#?");
    }

    #[test]
    fn command_letters_inside_junk_split_the_group() {
        // The `s` of `oops` starts a smooth curve, leaving `L 10` unpaired and `s 10` too short
        let estimate = estimate("M 0 0 L 10 oops 10 Z");
        assert_eq!(estimate.anchor, point(0., 0.));
        assert_eq!(
            estimate.bounding_box,
            Some(Box2D::new(point(0., 0.), point(0., 0.)))
        );
        assert_eq!(estimate.discarded[0].text, "oop");
    }

    #[test]
    fn huge_coordinates_stay_inside_the_box() {
        let estimate = estimate("M 1e308 0 L 1.7e308 10");
        let bounding_box = estimate.bounding_box.unwrap();
        assert!(estimate.anchor.x.is_finite());
        assert!(bounding_box.contains(estimate.anchor));
        assert_eq!(estimate.anchor.y, 5.);
    }

    #[test]
    fn compact_arc_flags_agree_with_strict() {
        for d in ["M0 0a25 25 0 0150 50", "M10 10A5 5 0 1 1 30 30", "M0 0a1 1 0 11-4 4"] {
            assert_eq!(strict_label_anchor(d).unwrap(), label_anchor(d), "{d}");
        }
        assert_eq!(label_anchor("M0 0a25 25 0 0150 50"), point(25., 25.));
    }

    #[test]
    fn bounding_box_only_grows() {
        let d = "M 5 5 l 10 -20 h -30 v 40 c 1 2 3 4 50 5 s 1 1 -5 -60 q 0 0 3 3 t 2 2 a 1 1 0 0 0 -7 7 z";
        let commands = path::tokenize(d).commands;
        let mut cursor = Cursor::new(BoundsTurtle::default());
        let mut previous: Option<Box2D<f64>> = None;
        for command in &commands {
            apply_command(&mut cursor, command);
            let current = cursor.turtle.bounding_box.expect("moveto visits a point");
            if let Some(previous) = previous {
                assert!(current.min.x <= previous.min.x);
                assert!(current.min.y <= previous.min.y);
                assert!(current.max.x >= previous.max.x);
                assert!(current.max.y >= previous.max.y);
            }
            previous = Some(current);
        }

        let estimate = estimate(d);
        let bounding_box = estimate.bounding_box.unwrap();
        assert!(bounding_box.contains(estimate.anchor));
    }

    #[test]
    fn strict_agrees_on_well_formed_paths() {
        for d in [
            "M 0 0 L 10 0 L 10 10 L 0 10 Z",
            "m 3 4 h 5 v -2 h -10 z",
            "M80 80c5-5 10 0 10 10s-10 5-10 0",
            "M 0 0 20 0 20 20",
            "M 10 10 A 5 5 0 1 0 30 30 T 40 0",
        ] {
            assert_eq!(strict_label_anchor(d).unwrap(), label_anchor(d), "{d}");
        }
    }

    #[test]
    fn strict_rejects_what_lenient_skips() {
        let d = "M 0 0 L 10 #? 10 Z";
        assert!(strict_label_anchor(d).is_err());
        assert_eq!(label_anchor(d), point(5., 5.));
    }
}
