use lyon_geom::{Box2D, Point};

use super::Turtle;

/// Folds every visited position into a running bounding box
#[derive(Debug, Default)]
pub struct BoundsTurtle {
    /// `None` until the first position is visited
    pub bounding_box: Option<Box2D<f64>>,
}

impl BoundsTurtle {
    fn fold(&mut self, to: Point<f64>) {
        self.bounding_box = Some(match self.bounding_box {
            Some(bounding_box) => Box2D::from_points([bounding_box.min, bounding_box.max, to]),
            None => Box2D::new(to, to),
        });
    }
}

impl Turtle for BoundsTurtle {
    fn move_to(&mut self, to: Point<f64>) {
        self.fold(to);
    }

    fn line_to(&mut self, to: Point<f64>) {
        self.fold(to);
    }

    fn curve_to(&mut self, to: Point<f64>) {
        self.fold(to);
    }

    fn close(&mut self, to: Point<f64>) {
        self.fold(to);
    }
}
