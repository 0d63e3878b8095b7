use std::f32::consts::PI;

use serde::Serialize;

use crate::config::ForceLayoutConfig;
use crate::layout::Point;

const INITIAL_RADIUS: f32 = 10.0;

/// Simulated particle. `fx`/`fy` pin the body and suppress integration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
}

impl Body {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Link {
    source: usize,
    target: usize,
    strength: f32,
    /// Share of the correction applied to the target.
    bias: f32,
}

/// Linear congruential generator used for jiggling coincident points.
#[derive(Debug, Clone, Copy)]
struct Lcg(u32);

impl Lcg {
    const A: u32 = 1_664_525;
    const C: u32 = 1_013_904_223;

    fn next(&mut self) -> f32 {
        self.0 = Self::A.wrapping_mul(self.0).wrapping_add(Self::C);
        (self.0 as f64 / 4_294_967_296.0) as f32
    }

    fn jiggle(&mut self) -> f32 {
        (self.next() - 0.5) * 1e-6
    }
}

/// Velocity Verlet style simulation with link, many-body, center, collide
/// and positioning forces, cooled by `alpha`.
#[derive(Debug, Clone)]
pub struct Simulation {
    bodies: Vec<Body>,
    radii: Vec<f32>,
    links: Vec<Link>,
    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,
    link_distance: f32,
    charge_strength: f32,
    charge_distance_min2: f32,
    collide_padding: f32,
    collide_strength: f32,
    axis_strength: f32,
    running: bool,
    random: Lcg,
}

impl Simulation {
    /// Bodies start on a phyllotaxis spiral around the origin.
    pub fn new(radii: Vec<f32>, links: &[(usize, usize)], config: &ForceLayoutConfig) -> Self {
        let angle_step = PI * (3.0 - 5f32.sqrt());
        let bodies = (0..radii.len())
            .map(|i| {
                let radius = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
                let angle = i as f32 * angle_step;
                Body {
                    x: radius * angle.cos(),
                    y: radius * angle.sin(),
                    ..Body::default()
                }
            })
            .collect();

        let mut count = vec![0usize; radii.len()];
        for &(source, target) in links {
            count[source] += 1;
            count[target] += 1;
        }
        let links = links
            .iter()
            .map(|&(source, target)| {
                let (cs, ct) = (count[source] as f32, count[target] as f32);
                Link {
                    source,
                    target,
                    strength: 1.0 / cs.min(ct),
                    bias: cs / (cs + ct),
                }
            })
            .collect();

        Self {
            bodies,
            radii,
            links,
            alpha: 1.0,
            alpha_min: config.alpha_min,
            alpha_decay: config.resolved_alpha_decay(),
            alpha_target: 0.0,
            velocity_decay: 1.0 - config.velocity_decay,
            link_distance: config.link_distance,
            charge_strength: config.charge_strength,
            charge_distance_min2: config.charge_distance_min * config.charge_distance_min,
            collide_padding: config.collide_padding,
            collide_strength: config.collide_strength,
            axis_strength: config.axis_strength,
            running: true,
            random: Lcg(1),
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, idx: usize) -> Option<&Body> {
        self.bodies.get(idx)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn restart(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Pins a body; the next tick snaps it onto the pin.
    pub fn pin(&mut self, idx: usize, at: Point) -> bool {
        let Some(body) = self.bodies.get_mut(idx) else {
            return false;
        };
        body.fx = Some(at.x);
        body.fy = Some(at.y);
        true
    }

    pub fn unpin(&mut self, idx: usize) {
        if let Some(body) = self.bodies.get_mut(idx) {
            body.fx = None;
            body.fy = None;
        }
    }

    /// Advances one step while the simulation is running.
    ///
    /// Returns `false` once alpha has cooled below `alpha_min`; the simulation
    /// then stays stopped until [`Simulation::restart`].
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;

        self.apply_links(alpha);
        self.apply_many_body(alpha);
        self.apply_center();
        self.apply_collide();
        self.apply_axis(alpha);

        for body in &mut self.bodies {
            match body.fx {
                Some(fx) => {
                    body.x = fx;
                    body.vx = 0.0;
                }
                None => {
                    body.vx *= self.velocity_decay;
                    body.x += body.vx;
                }
            }
            match body.fy {
                Some(fy) => {
                    body.y = fy;
                    body.vy = 0.0;
                }
                None => {
                    body.vy *= self.velocity_decay;
                    body.y += body.vy;
                }
            }
        }

        if self.alpha < self.alpha_min {
            self.running = false;
        }
        self.running
    }

    /// Ticks until the simulation cools or `max_ticks` is reached.
    pub fn run_to_rest(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.running {
            self.tick();
            ticks += 1;
        }
        tracing::debug!(ticks, alpha = self.alpha, "force simulation settled");
        ticks
    }

    fn apply_links(&mut self, alpha: f32) {
        for link in &self.links {
            let source = self.bodies[link.source];
            let target = self.bodies[link.target];
            let mut x = target.x + target.vx - source.x - source.vx;
            if x == 0.0 {
                x = self.random.jiggle();
            }
            let mut y = target.y + target.vy - source.y - source.vy;
            if y == 0.0 {
                y = self.random.jiggle();
            }
            let length = (x * x + y * y).sqrt();
            let scale = (length - self.link_distance) / length * alpha * link.strength;
            x *= scale;
            y *= scale;

            let target = &mut self.bodies[link.target];
            target.vx -= x * link.bias;
            target.vy -= y * link.bias;
            let source = &mut self.bodies[link.source];
            source.vx += x * (1.0 - link.bias);
            source.vy += y * (1.0 - link.bias);
        }
    }

    fn apply_many_body(&mut self, alpha: f32) {
        let n = self.bodies.len();
        let mut dv = vec![(0.0f32, 0.0f32); n];
        for i in 0..n {
            let (xi, yi) = (self.bodies[i].x, self.bodies[i].y);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut x = self.bodies[j].x - xi;
                let mut y = self.bodies[j].y - yi;
                let mut l = x * x + y * y;
                if x == 0.0 {
                    x = self.random.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.random.jiggle();
                    l += y * y;
                }
                if l < self.charge_distance_min2 {
                    l = (self.charge_distance_min2 * l).sqrt();
                }
                let w = self.charge_strength * alpha / l;
                dv[i].0 += x * w;
                dv[i].1 += y * w;
            }
        }
        for (body, (dx, dy)) in self.bodies.iter_mut().zip(dv) {
            body.vx += dx;
            body.vy += dy;
        }
    }

    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let n = self.bodies.len() as f32;
        let (sx, sy) = self
            .bodies
            .iter()
            .fold((0.0, 0.0), |(sx, sy), body| (sx + body.x, sy + body.y));
        let (sx, sy) = (sx / n, sy / n);
        for body in &mut self.bodies {
            body.x -= sx;
            body.y -= sy;
        }
    }

    fn apply_collide(&mut self) {
        let n = self.bodies.len();
        for i in 0..n {
            let ri = self.radii[i] + self.collide_padding;
            let ri2 = ri * ri;
            let xi = self.bodies[i].x + self.bodies[i].vx;
            let yi = self.bodies[i].y + self.bodies[i].vy;
            for j in (i + 1)..n {
                let rj = self.radii[j] + self.collide_padding;
                let r = ri + rj;
                let other = self.bodies[j];
                let mut x = xi - (other.x + other.vx);
                let mut y = yi - (other.y + other.vy);
                let mut l = x * x + y * y;
                if l >= r * r {
                    continue;
                }
                if x == 0.0 {
                    x = self.random.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.random.jiggle();
                    l += y * y;
                }
                let dist = l.sqrt();
                let push = (r - dist) / dist * self.collide_strength;
                x *= push;
                y *= push;
                let rj2 = rj * rj;
                let share = rj2 / (ri2 + rj2);
                self.bodies[i].vx += x * share;
                self.bodies[i].vy += y * share;
                self.bodies[j].vx -= x * (1.0 - share);
                self.bodies[j].vy -= y * (1.0 - share);
            }
        }
    }

    fn apply_axis(&mut self, alpha: f32) {
        let k = self.axis_strength * alpha;
        for body in &mut self.bodies {
            body.vx -= body.x * k;
            body.vy -= body.y * k;
        }
    }
}
