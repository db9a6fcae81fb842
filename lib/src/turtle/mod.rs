use std::fmt::Debug;

use lyon_geom::{point, Point};

mod bounds;
pub use self::bounds::BoundsTurtle;

/// Abstraction based on [Turtle graphics](https://en.wikipedia.org/wiki/Turtle_graphics)
///
/// Receives every position the cursor visits, already resolved to absolute coordinates.
pub trait Turtle: Debug {
    fn move_to(&mut self, to: Point<f64>);
    fn line_to(&mut self, to: Point<f64>);
    /// Curves and arcs are reduced to their end point
    fn curve_to(&mut self, to: Point<f64>);
    fn close(&mut self, to: Point<f64>);
}

/// Wrapper for [Turtle] that tracks the current position and the start of the subpath.
/// See <https://www.w3.org/TR/SVG/paths.html>
#[derive(Debug)]
pub struct Cursor<T: Turtle> {
    pub turtle: T,
    current_position: Point<f64>,
    initial_position: Option<Point<f64>>,
}

impl<T: Turtle> Cursor<T> {
    /// Create a cursor at the origin that has not moved yet
    pub fn new(turtle: T) -> Self {
        Self {
            turtle,
            current_position: Point::origin(),
            initial_position: None,
        }
    }

    pub fn position(&self) -> Point<f64> {
        self.current_position
    }

    /// Position of the most recent moveto, if there was one
    pub fn last_move(&self) -> Option<Point<f64>> {
        self.initial_position
    }

    fn resolve<X, Y>(&self, abs: bool, x: X, y: Y) -> Point<f64>
    where
        X: Into<Option<f64>>,
        Y: Into<Option<f64>>,
    {
        let from = self.current_position;
        let x = x
            .into()
            .map(|x| if abs { x } else { from.x + x })
            .unwrap_or(from.x);
        let y = y
            .into()
            .map(|y| if abs { y } else { from.y + y })
            .unwrap_or(from.y);
        point(x, y)
    }

    /// Move to the given absolute/relative coordinates and start a new subpath
    /// <https://www.w3.org/TR/SVG/paths.html#PathDataMovetoCommands>
    pub fn move_to(&mut self, abs: bool, x: f64, y: f64) {
        let to = self.resolve(abs, x, y);
        self.current_position = to;
        self.initial_position = Some(to);
        self.turtle.move_to(to);
    }

    /// Draw a line to the given position; a missing axis keeps its current value (H and V)
    /// <https://www.w3.org/TR/SVG/paths.html#PathDataLinetoCommands>
    pub fn line<X, Y>(&mut self, abs: bool, x: X, y: Y)
    where
        X: Into<Option<f64>>,
        Y: Into<Option<f64>>,
    {
        let to = self.resolve(abs, x, y);
        self.current_position = to;
        self.turtle.line_to(to);
    }

    /// Jump along a curve or arc to its end point, ignoring control points and radii
    pub fn curve(&mut self, abs: bool, to: Point<f64>) {
        let to = self.resolve(abs, to.x, to.y);
        self.current_position = to;
        self.turtle.curve_to(to);
    }

    /// Close the subpath, returning to its initial position
    /// <https://www.w3.org/TR/SVG/paths.html#PathDataClosePathCommand>
    pub fn close(&mut self) {
        let to = self.initial_position.unwrap_or_else(Point::origin);
        self.current_position = to;
        self.turtle.close(to);
    }
}
