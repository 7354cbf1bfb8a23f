use super::layout::Point;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Zoom used when framing a single point.
const POINT_ZOOM: f64 = 2.0;

/// Screen = graph * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	/// Graph origin at the center of the viewport, unscaled.
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, p: Point) -> (f64, f64) {
		(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Frame `points` inside a `width` x `height` viewport with `padding`
	/// pixels on every side. `None` when there is nothing to frame.
	pub fn fit<I>(points: I, width: f64, height: f64, padding: f64) -> Option<Self>
	where
		I: IntoIterator<Item = Point>,
	{
		let mut points = points.into_iter();
		let first = points.next()?;
		let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
		for p in points {
			min_x = min_x.min(p.x);
			min_y = min_y.min(p.y);
			max_x = max_x.max(p.x);
			max_y = max_y.max(p.y);
		}

		let (bw, bh) = (max_x - min_x, max_y - min_y);
		let (aw, ah) = ((width - 2.0 * padding).max(1.0), (height - 2.0 * padding).max(1.0));
		let k = if bw <= f64::EPSILON && bh <= f64::EPSILON {
			POINT_ZOOM
		} else {
			let kx = if bw > f64::EPSILON { aw / bw } else { f64::INFINITY };
			let ky = if bh > f64::EPSILON { ah / bh } else { f64::INFINITY };
			kx.min(ky)
		}
		.clamp(MIN_ZOOM, MAX_ZOOM);

		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		Some(Self {
			x: width / 2.0 - cx * k,
			y: height / 2.0 - cy * k,
			k,
		})
	}

	/// Zoom by `factor` around a fixed screen point.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fit_centers_and_contains_points() {
		let pts = [Point { x: -50.0, y: 0.0 }, Point { x: 50.0, y: 20.0 }];
		let t = ViewTransform::fit(pts, 400.0, 300.0, 50.0).unwrap();
		assert!((t.k - 3.0).abs() < 1e-9);
		let (sx, sy) = t.graph_to_screen(Point { x: 0.0, y: 10.0 });
		assert!((sx - 200.0).abs() < 1e-9);
		assert!((sy - 150.0).abs() < 1e-9);
		for p in pts {
			let (sx, sy) = t.graph_to_screen(p);
			assert!((50.0 - 1e-9..=350.0 + 1e-9).contains(&sx));
			assert!((50.0 - 1e-9..=250.0 + 1e-9).contains(&sy));
		}
	}

	#[test]
	fn fit_single_point_uses_fixed_zoom() {
		let t = ViewTransform::fit([Point { x: 10.0, y: 10.0 }], 200.0, 200.0, 20.0).unwrap();
		assert_eq!(t.k, POINT_ZOOM);
		assert_eq!(t.graph_to_screen(Point { x: 10.0, y: 10.0 }), (100.0, 100.0));
	}

	#[test]
	fn fit_nothing_is_none() {
		assert!(ViewTransform::fit(std::iter::empty(), 200.0, 200.0, 20.0).is_none());
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut t = ViewTransform::centered(200.0, 200.0);
		let before = t.screen_to_graph(30.0, 40.0);
		t.zoom_at(30.0, 40.0, 1.1);
		let after = t.screen_to_graph(30.0, 40.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}
}
