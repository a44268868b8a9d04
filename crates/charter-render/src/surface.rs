//! Immediate-mode drawing target.
//!
//! [`Surface`] is the only thing the renderer draws into. [`DisplayList`]
//! records calls so frames can be inspected without a window.

/// Screen position in CSS pixels from the top-left corner.
///
/// X increases to the right, Y increases downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<(f64, f64)> for Point {
    fn from(pos: (f64, f64)) -> Self {
        Self::new(pos.0, pos.1)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x - 1e-9
            && other.y >= self.y - 1e-9
            && other.right() <= self.right() + 1e-9
            && other.bottom() <= self.bottom() + 1e-9
    }

    /// Move `self` so it lies inside `bounds`, keeping its size where possible.
    #[must_use]
    pub fn clamped_within(self, bounds: &Rect) -> Rect {
        let width = self.width.min(bounds.width);
        let height = self.height.min(bounds.height);
        let x = self.x.clamp(bounds.x, bounds.right() - width);
        let y = self.y.clamp(bounds.y, bounds.bottom() - height);
        Rect::new(x, y, width, height)
    }
}

/// RGBA color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    Close,
}

/// A vector path built from move/line/quadratic segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cmds: Vec<PathCmd>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.cmds.push(PathCmd::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.cmds.push(PathCmd::LineTo(p));
        self
    }

    pub fn quad_to(&mut self, ctrl: Point, to: Point) -> &mut Self {
        self.cmds.push(PathCmd::QuadTo { ctrl, to });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.cmds.push(PathCmd::Close);
        self
    }

    pub fn cmds(&self) -> &[PathCmd] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Every point referenced by the path, control points included.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.cmds.iter().flat_map(|cmd| match *cmd {
            PathCmd::MoveTo(p) | PathCmd::LineTo(p) => vec![p],
            PathCmd::QuadTo { ctrl, to } => vec![ctrl, to],
            PathCmd::Close => Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A 2D immediate-mode drawing target.
///
/// Coordinates are CSS pixels; implementations scale by the device pixel
/// ratio given to [`Surface::begin_frame`].
pub trait Surface {
    fn begin_frame(&mut self, width: f64, height: f64, device_pixel_ratio: f64);
    fn save(&mut self);
    fn restore(&mut self);
    /// Intersect the current clip with `rect` until the matching `restore`.
    fn clip_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64);
    fn stroke_path(&mut self, path: &Path, color: Color, width: f64);
    fn fill_path(&mut self, path: &Path, color: Color);
    /// Draw text with its baseline at `at.y`.
    fn fill_text(&mut self, text: &str, at: Point, color: Color, align: TextAlign);

    /// Approximate advance width of `text`.
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * 7.0
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame {
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },
    StrokePath {
        path: Path,
        color: Color,
        width: f64,
    },
    FillPath {
        path: Path,
        color: Color,
    },
    Text {
        text: String,
        at: Point,
        color: Color,
        align: TextAlign,
    },
}

/// A recorded command together with the clip active when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub command: DrawCommand,
    pub clip: Option<Rect>,
}

/// Surface that records every call.
#[derive(Debug, Default)]
pub struct DisplayList {
    recorded: Vec<Recorded>,
    clip_stack: Vec<Option<Rect>>,
    clip: Option<Rect>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> &[Recorded] {
        &self.recorded
    }

    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.recorded.iter().map(|r| &r.command)
    }

    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }

    /// Text strings drawn this frame, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether save/restore calls balanced out.
    pub fn is_balanced(&self) -> bool {
        self.clip_stack.is_empty()
    }

    fn push(&mut self, command: DrawCommand) {
        self.recorded.push(Recorded {
            command,
            clip: self.clip,
        });
    }
}

fn intersect(a: Rect, b: Rect) -> Rect {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
}

impl Surface for DisplayList {
    fn begin_frame(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        self.recorded.clear();
        self.clip_stack.clear();
        self.clip = None;
        self.push(DrawCommand::BeginFrame {
            width,
            height,
            device_pixel_ratio,
        });
    }

    fn save(&mut self) {
        self.clip_stack.push(self.clip);
    }

    fn restore(&mut self) {
        if let Some(clip) = self.clip_stack.pop() {
            self.clip = clip;
        }
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.clip = Some(match self.clip {
            Some(current) => intersect(current, rect),
            None => rect,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        self.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn stroke_path(&mut self, path: &Path, color: Color, width: f64) {
        self.push(DrawCommand::StrokePath {
            path: path.clone(),
            color,
            width,
        });
    }

    fn fill_path(&mut self, path: &Path, color: Color) {
        self.push(DrawCommand::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn fill_text(&mut self, text: &str, at: Point, color: Color, align: TextAlign) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            color,
            align,
        });
    }
}
