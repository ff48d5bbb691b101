//! Navigation and pathfinding
//!
//! The steering core only talks to navigation through [`Navigator`]. A small
//! grid nav mesh with A* ([`GridNavigator`]) is provided so the simulation can
//! run without an external engine.

use herd_core::{AgentId, HerdError, Result};
use herd_math::Vec3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Default distance at which a waypoint counts as reached
pub const DEFAULT_WAYPOINT_REACHED_DISTANCE: f32 = 1.0;

/// Navigation collaborator seen by the steering core.
///
/// `set_destination` is the expensive query the path scheduler rate-limits;
/// the remaining methods read the path the last query produced.
pub trait Navigator {
    /// Plan a path for `agent` from `from` to `target`
    fn set_destination(&mut self, agent: AgentId, from: Vec3, target: Vec3);

    /// Next waypoint to steer toward given the agent's current position, or
    /// `None` when there is no usable path
    fn next_waypoint(&mut self, agent: AgentId, position: Vec3) -> Option<Vec3>;

    /// Number of points in the agent's current path (0 without a path)
    fn path_length(&self, agent: AgentId) -> usize;

    /// Index of the point the agent is currently heading to
    fn path_index(&self, agent: AgentId) -> usize;

    /// Drop any state held for `agent`
    fn forget(&mut self, _agent: AgentId) {}
}

/// A polygon in the navigation mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavPolygon {
    /// Indices into [`NavMesh::vertices`]
    pub vertices: Vec<usize>,
    pub center: Vec3,
    /// Indices of polygons sharing an edge with this one
    pub neighbors: Vec<usize>,
    pub walkable: bool,
}

impl NavPolygon {
    pub fn new(vertices: Vec<usize>, center: Vec3) -> Self {
        Self {
            vertices,
            center,
            neighbors: Vec::new(),
            walkable: true,
        }
    }
}

/// Cell size of the lookup hash when none is given
pub const DEFAULT_CELL_SIZE: f32 = 5.0;

/// Walkable polygons plus a hash from XZ cells to the polygons centered in them.
///
/// The hash is not serialized; it is rebuilt when a mesh is deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MeshLayout")]
pub struct NavMesh {
    pub vertices: Vec<Vec3>,
    pub polygons: Vec<NavPolygon>,
    cell_size: f32,
    #[serde(skip)]
    spatial_hash: HashMap<(i32, i32), Vec<usize>>,
}

/// Serialized form of a [`NavMesh`]
#[derive(Deserialize)]
struct MeshLayout {
    vertices: Vec<Vec3>,
    polygons: Vec<NavPolygon>,
    cell_size: f32,
}

impl TryFrom<MeshLayout> for NavMesh {
    type Error = HerdError;

    fn try_from(layout: MeshLayout) -> Result<Self> {
        if !(layout.cell_size > 0.0 && layout.cell_size.is_finite()) {
            return Err(HerdError::InvalidConfig(format!(
                "nav mesh cell size must be positive, got {}",
                layout.cell_size
            )));
        }

        let vertex_count = layout.vertices.len();
        let polygon_count = layout.polygons.len();
        for (idx, poly) in layout.polygons.iter().enumerate() {
            let dangling = poly.vertices.iter().any(|&v| v >= vertex_count)
                || poly.neighbors.iter().any(|&n| n >= polygon_count);
            if dangling {
                return Err(HerdError::InvalidConfig(format!(
                    "nav polygon {} references a missing vertex or neighbor",
                    idx
                )));
            }
        }

        let mut mesh = Self {
            vertices: layout.vertices,
            polygons: layout.polygons,
            cell_size: layout.cell_size,
            spatial_hash: HashMap::new(),
        };
        mesh.rebuild_spatial_hash();
        Ok(mesh)
    }
}

impl Default for NavMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl NavMesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            polygons: Vec::new(),
            cell_size: DEFAULT_CELL_SIZE,
            spatial_hash: HashMap::new(),
        }
    }

    /// Flat grid of square cells on the XZ plane, starting at the origin.
    ///
    /// A non-positive `cell_size` falls back to [`DEFAULT_CELL_SIZE`].
    pub fn create_grid(width: f32, depth: f32, cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() {
            cell_size
        } else {
            log::warn!("Grid cell size {} is unusable, using {}", cell_size, DEFAULT_CELL_SIZE);
            DEFAULT_CELL_SIZE
        };

        let cols = (width / cell_size).ceil().max(0.0) as usize;
        let rows = (depth / cell_size).ceil().max(0.0) as usize;
        let stride = cols + 1;

        let mut mesh = Self {
            cell_size,
            ..Self::new()
        };
        let at = move |col: usize, row: usize| Vec3::new(col as f32, 0.0, row as f32) * cell_size;
        mesh.vertices = (0..=rows)
            .flat_map(|row| (0..=cols).map(move |col| at(col, row)))
            .collect();

        for row in 0..rows {
            for col in 0..cols {
                let corner = row * stride + col;
                let quad = vec![corner, corner + 1, corner + stride + 1, corner + stride];
                let center = at(col, row) + Vec3::new(0.5, 0.0, 0.5) * cell_size;
                let mut poly = NavPolygon::new(quad, center);

                let idx = row * cols + col;
                if col > 0 {
                    poly.neighbors.push(idx - 1);
                }
                if col + 1 < cols {
                    poly.neighbors.push(idx + 1);
                }
                if row > 0 {
                    poly.neighbors.push(idx - cols);
                }
                if row + 1 < rows {
                    poly.neighbors.push(idx + cols);
                }
                mesh.polygons.push(poly);
            }
        }

        mesh.rebuild_spatial_hash();
        mesh
    }

    pub fn rebuild_spatial_hash(&mut self) {
        self.spatial_hash.clear();
        for (idx, poly) in self.polygons.iter().enumerate() {
            let cell = self.cell_of(poly.center);
            self.spatial_hash.entry(cell).or_default().push(idx);
        }
    }

    fn cell_of(&self, point: Vec3) -> (i32, i32) {
        (
            (point.x / self.cell_size).floor() as i32,
            (point.z / self.cell_size).floor() as i32,
        )
    }

    /// Polygon under `point`, searching its hash cell and the eight around it
    pub fn find_polygon(&self, point: Vec3) -> Option<usize> {
        let (cell_x, cell_z) = self.cell_of(point);

        (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dz| (dx, dz)))
            .map(|(dx, dz)| (cell_x.saturating_add(dx), cell_z.saturating_add(dz)))
            .filter_map(|cell| self.spatial_hash.get(&cell))
            .flatten()
            .copied()
            .find(|&idx| self.contains(idx, point))
    }

    /// XZ bounding-box test, exact for grid quads
    fn contains(&self, polygon: usize, point: Vec3) -> bool {
        let mut corners = self.polygons[polygon]
            .vertices
            .iter()
            .filter_map(|&i| self.vertices.get(i));

        let Some(first) = corners.next() else {
            return false;
        };
        let (min, max) = corners.fold((*first, *first), |(lo, hi), v| {
            (
                Vec3::new(lo.x.min(v.x), 0.0, lo.z.min(v.z)),
                Vec3::new(hi.x.max(v.x), 0.0, hi.z.max(v.z)),
            )
        });

        (min.x..=max.x).contains(&point.x) && (min.z..=max.z).contains(&point.z)
    }

    /// Path from `start` to `end` through the centers of the polygons between
    /// them. `None` if either point is off the mesh or on an unwalkable
    /// polygon, or if no walkable route connects them.
    pub fn find_path(&self, start: Vec3, end: Vec3) -> Option<NavPath> {
        let from = self.find_polygon(start)?;
        let to = self.find_polygon(end)?;

        if !self.polygons[from].walkable || !self.polygons[to].walkable {
            return None;
        }
        if from == to {
            return Some(NavPath::new(vec![start, end]));
        }

        let route = self.astar(from, to)?;

        // endpoints' own centers would only pull the agent sideways
        let inner = route[1..route.len() - 1].iter().map(|&idx| self.polygons[idx].center);
        let waypoints = std::iter::once(start).chain(inner).chain(std::iter::once(end)).collect();

        Some(NavPath::new(waypoints))
    }

    /// A* over polygon adjacency, with center distances as edge costs
    fn astar(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        let goal_center = self.polygons[goal].center;
        let count = self.polygons.len();

        let mut best = vec![f32::INFINITY; count];
        let mut parent: Vec<Option<usize>> = vec![None; count];
        let mut settled = vec![false; count];
        let mut frontier = BinaryHeap::new();

        best[start] = 0.0;
        frontier.push(Frontier {
            polygon: start,
            estimate: self.polygons[start].center.distance(goal_center),
        });

        while let Some(Frontier { polygon, .. }) = frontier.pop() {
            if polygon == goal {
                let mut route = vec![goal];
                let mut cursor = goal;
                while let Some(prev) = parent[cursor] {
                    route.push(prev);
                    cursor = prev;
                }
                route.reverse();
                return Some(route);
            }

            if std::mem::replace(&mut settled[polygon], true) {
                continue;
            }

            let here = &self.polygons[polygon];
            for &next in &here.neighbors {
                let Some(candidate) = self.polygons.get(next) else {
                    continue;
                };
                if settled[next] || !candidate.walkable {
                    continue;
                }

                let cost = best[polygon] + here.center.distance(candidate.center);
                if cost < best[next] {
                    best[next] = cost;
                    parent[next] = Some(polygon);
                    frontier.push(Frontier {
                        polygon: next,
                        estimate: cost + candidate.center.distance(goal_center),
                    });
                }
            }
        }

        None
    }

    pub fn set_walkable(&mut self, polygon: usize, walkable: bool) {
        if let Some(poly) = self.polygons.get_mut(polygon) {
            poly.walkable = walkable;
        }
    }
}

/// Open-set entry; the heap pops the lowest estimate first
#[derive(Debug, Clone, Copy)]
struct Frontier {
    polygon: usize,
    estimate: f32,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.polygon.cmp(&self.polygon))
    }
}

/// A path through the navigation mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavPath {
    /// Waypoints along the path
    pub waypoints: Vec<Vec3>,
    /// Current waypoint index
    pub current_index: usize,
}

impl NavPath {
    /// Create a path starting at its first waypoint
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self {
            waypoints,
            current_index: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether the cursor sits on the last waypoint
    pub fn on_final_waypoint(&self) -> bool {
        !self.is_empty() && self.current_index + 1 >= self.waypoints.len()
    }

    /// Get current waypoint
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.current_index).copied()
    }

    /// Advance to next waypoint, stopping at the last one
    pub fn advance(&mut self) {
        if self.current_index + 1 < self.waypoints.len() {
            self.current_index += 1;
        }
    }
}

/// [`Navigator`] backed by a [`NavMesh`], holding one path per agent
#[derive(Debug, Clone)]
pub struct GridNavigator {
    mesh: NavMesh,
    paths: HashMap<AgentId, NavPath>,
    reached_distance: f32,
    queries: u64,
}

impl GridNavigator {
    pub fn new(mesh: NavMesh) -> Self {
        Self {
            mesh,
            paths: HashMap::new(),
            reached_distance: DEFAULT_WAYPOINT_REACHED_DISTANCE,
            queries: 0,
        }
    }

    /// Set distance at which intermediate waypoints count as reached
    pub fn with_reached_distance(mut self, distance: f32) -> Self {
        self.reached_distance = distance;
        self
    }

    pub fn mesh(&self) -> &NavMesh {
        &self.mesh
    }

    /// The agent's current path, if any
    pub fn path(&self, agent: AgentId) -> Option<&NavPath> {
        self.paths.get(&agent)
    }

    /// Total number of path queries served
    pub fn query_count(&self) -> u64 {
        self.queries
    }
}

impl Navigator for GridNavigator {
    fn set_destination(&mut self, agent: AgentId, from: Vec3, target: Vec3) {
        self.queries += 1;

        match self.mesh.find_path(from, target) {
            Some(path) => {
                log::trace!("{}: path of {} points to {:?}", agent, path.len(), target);
                self.paths.insert(agent, path);
            }
            None => {
                if self.paths.remove(&agent).is_some() {
                    log::warn!("{}: destination {:?} is unreachable", agent, target);
                } else {
                    log::debug!("{}: still no path to {:?}", agent, target);
                }
            }
        }
    }

    fn next_waypoint(&mut self, agent: AgentId, position: Vec3) -> Option<Vec3> {
        let path = self.paths.get_mut(&agent)?;

        while !path.on_final_waypoint() {
            match path.current_waypoint() {
                Some(wp) if wp.distance(position) < self.reached_distance => path.advance(),
                _ => break,
            }
        }

        path.current_waypoint()
    }

    fn path_length(&self, agent: AgentId) -> usize {
        self.paths.get(&agent).map_or(0, NavPath::len)
    }

    fn path_index(&self, agent: AgentId) -> usize {
        self.paths.get(&agent).map_or(0, |p| p.current_index)
    }

    fn forget(&mut self, agent: AgentId) {
        self.paths.remove(&agent);
    }
}
