//! Pointer-drag state machine that draws a connection between two ports.
//!
//! A draw starts on an outward port (output or tool). The set of ports it
//! could legally end on is computed once at start; every pointer move snaps
//! the loose end to the nearest of those within the snap radius.
//!
//! On release the target is resolved in priority order:
//!
//! 1. an explicit drop target reported by the host,
//! 2. the port the endpoint is currently snapped to,
//! 3. a hit-test of every port within the hit radius of the release point.
//!
//! The resolved pair then goes through a [`ConnectionValidator`]. The
//! controller never mutates the graph; it hands a ready [`Connection`] back to
//! the editor.

use crate::coords::{screen_to_canvas, Point, Transform};
use crate::geometry::{GeometryCache, PortAnchor};
use crate::graph::{
    Connection, ConnectionRequest, ConnectionValidator, Graph, PortRef, ValidationError,
    ValidationResult,
};
use crate::hit_test::find_nearest_port;
use crate::ports::PortRegistry;
use log::{debug, trace};

/// Live state of the loose end, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPreview {
    pub source: PortRef,
    /// Canvas position of the source port.
    pub start: Point,
    /// Canvas position of the loose end. Equal to the snapped port's anchor
    /// while snapped.
    pub end: Point,
    pub snapped: Option<PortRef>,
}

/// How a draw gesture finished.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    Created(Connection),
    /// No connection was made. `reason` is set when a target was found but
    /// rejected by validation.
    Cancelled { reason: Option<ValidationError> },
}

#[derive(Debug, Clone)]
struct DrawSession {
    source: PortAnchor,
    targets: Vec<PortAnchor>,
    end: Point,
    snapped: Option<PortAnchor>,
}

impl DrawSession {
    fn preview(&self) -> ConnectionPreview {
        ConnectionPreview {
            source: self.source.port_ref(),
            start: self.source.position,
            end: self.end,
            snapped: self.snapped.as_ref().map(PortAnchor::port_ref),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionDrawController {
    session: Option<DrawSession>,
    snap_radius: f32,
    hit_radius: f32,
}

impl ConnectionDrawController {
    pub fn new(snap_radius: f32, hit_radius: f32) -> Self {
        Self {
            session: None,
            snap_radius,
            hit_radius,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_some()
    }

    pub fn preview(&self) -> Option<ConnectionPreview> {
        self.session.as_ref().map(DrawSession::preview)
    }

    /// Ports the current draw could snap to.
    pub fn targets(&self) -> &[PortAnchor] {
        match &self.session {
            Some(session) => &session.targets,
            None => &[],
        }
    }

    /// Begin drawing from `source`.
    ///
    /// Fails (returning `None`) when already drawing, when the port is not on
    /// the canvas, or when it is not an outward port.
    pub fn start(
        &mut self,
        source: &PortRef,
        graph: &Graph,
        registry: &PortRegistry,
        geometry: &GeometryCache,
    ) -> Option<ConnectionPreview> {
        if self.session.is_some() {
            trace!("draw start ignored: already drawing");
            return None;
        }
        let Some(anchor) = geometry.anchor(source) else {
            trace!("draw start ignored: no anchor for {}:{}", source.node, source.port);
            return None;
        };
        if !anchor.kind.is_outward() {
            trace!("draw start ignored: port {} is not outward", source.port);
            return None;
        }

        let counts = graph.port_connection_counts();
        let targets: Vec<PortAnchor> = geometry
            .anchors()
            .iter()
            .filter(|a| a.node != source.node)
            .filter(|a| registry.is_valid_connection(&source.port, &a.port))
            .filter(|a| {
                let count = counts.get(&a.port_ref()).copied().unwrap_or(0);
                registry.can_accept_connection(&a.port, count)
            })
            .cloned()
            .collect();

        debug!(
            "draw start: {}:{} with {} candidate targets",
            source.node,
            source.port,
            targets.len()
        );
        let session = DrawSession {
            end: anchor.position,
            source: anchor.clone(),
            targets,
            snapped: None,
        };
        let preview = session.preview();
        self.session = Some(session);
        Some(preview)
    }

    /// Move the loose end to the screen point `pointer`, snapping to the
    /// nearest candidate target in range.
    pub fn move_to(&mut self, pointer: Point, transform: &Transform) -> Option<ConnectionPreview> {
        let snap_radius = self.snap_radius;
        let Some(session) = self.session.as_mut() else {
            trace!("draw move ignored: not drawing");
            return None;
        };
        let canvas = screen_to_canvas(pointer, transform);
        if !canvas.is_finite() {
            return None;
        }

        let nearest = find_nearest_port(canvas, session.targets.iter(), snap_radius).cloned();
        session.end = nearest.as_ref().map_or(canvas, |a| a.position);
        session.snapped = nearest;
        Some(session.preview())
    }

    /// Finish the draw. Returns `None` when idle.
    #[allow(clippy::too_many_arguments)]
    pub fn end(
        &mut self,
        pointer: Option<Point>,
        transform: &Transform,
        explicit_target: Option<PortRef>,
        graph: &Graph,
        registry: &PortRegistry,
        geometry: &GeometryCache,
        validator: &dyn ConnectionValidator,
    ) -> Option<DrawOutcome> {
        if let Some(pointer) = pointer {
            self.move_to(pointer, transform);
        }
        let Some(session) = self.session.take() else {
            trace!("draw end ignored: not drawing");
            return None;
        };

        let target = explicit_target
            .or_else(|| session.snapped.as_ref().map(PortAnchor::port_ref))
            .or_else(|| {
                geometry
                    .find_port_at(session.end, self.hit_radius)
                    .map(PortAnchor::port_ref)
            });

        let Some(target) = target else {
            debug!("draw cancelled: released on empty canvas");
            return Some(DrawOutcome::Cancelled { reason: None });
        };

        let request = ConnectionRequest::new(session.source.port_ref(), target);
        match validator.validate(&request, graph, registry) {
            ValidationResult::Valid => {
                let connection = request.into_connection();
                debug!(
                    "draw end: {}:{} -> {}:{}",
                    connection.from_node, connection.from_port, connection.to_node, connection.to_port
                );
                Some(DrawOutcome::Created(connection))
            }
            ValidationResult::Invalid(err) => {
                debug!("draw rejected: {err}");
                Some(DrawOutcome::Cancelled { reason: Some(err) })
            }
        }
    }

    /// Abort without evaluating a target. Returns whether a draw was active.
    pub fn cancel(&mut self) -> bool {
        let was_drawing = self.session.take().is_some();
        if was_drawing {
            debug!("draw cancelled");
        }
        was_drawing
    }
}
