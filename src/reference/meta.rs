use crate::model::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-patch champion strength scores plus the per-role candidate pools.
/// Read-only reference data; refreshed out-of-band, never by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaIndex {
    strength: HashMap<i32, f64>,
    role_pools: HashMap<Role, Vec<i32>>,
}

impl MetaIndex {
    /// Champions missing from the table score as average.
    pub const UNKNOWN_STRENGTH: f64 = 0.5;

    pub fn strength(&self, champion_id: i32) -> f64 {
        self.strength
            .get(&champion_id)
            .copied()
            .unwrap_or(Self::UNKNOWN_STRENGTH)
    }

    pub fn known_strength(&self, champion_id: i32) -> Option<f64> {
        self.strength.get(&champion_id).copied()
    }

    pub fn role_pool(&self, role: Role) -> &[i32] {
        self.role_pools
            .get(&role)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Champions at or above the strength floor, strongest first.
    /// Ties break on champion id so output order is stable.
    pub fn threats(&self, floor: f64) -> Vec<(i32, f64)> {
        let mut out: Vec<(i32, f64)> = self
            .strength
            .iter()
            .filter(|(_, s)| **s > floor)
            .map(|(id, s)| (*id, *s))
            .collect();
        out.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        out
    }

    pub fn builtin() -> Self {
        let strength = BUILTIN_STRENGTH.iter().copied().collect();

        let mut role_pools = HashMap::new();
        role_pools.insert(
            Role::Top,
            vec![
                266, 122, 86, 150, 79, 114, 420, 39, 240, 54, 57, 75, 516, 58, 92, 14, 27, 83,
                106, 19,
            ],
        );
        role_pools.insert(
            Role::Jungle,
            vec![
                32, 245, 60, 120, 104, 427, 59, 141, 121, 203, 64, 76, 56, 20, 2, 421, 107, 113,
                35, 102, 72, 77, 154,
            ],
        );
        role_pools.insert(
            Role::Mid,
            vec![
                103, 84, 1, 136, 268, 69, 42, 131, 28, 105, 3, 74, 38, 55, 10, 7, 127, 99, 90, 82,
                61, 80, 246, 13, 517, 134, 163, 91, 4, 112, 8, 142, 238, 115, 26,
            ],
        );
        role_pools.insert(
            Role::Bottom,
            vec![
                22, 51, 119, 81, 202, 222, 145, 429, 96, 236, 21, 15, 18, 110, 67, 29, 498,
            ],
        );
        role_pools.insert(
            Role::Support,
            vec![
                12, 432, 53, 63, 201, 40, 43, 89, 117, 25, 267, 111, 516, 78, 555, 497, 44, 16,
                50, 223, 412, 37, 143, 350,
            ],
        );

        MetaIndex {
            strength,
            role_pools,
        }
    }
}

impl Default for MetaIndex {
    fn default() -> Self {
        MetaIndex::builtin()
    }
}

const BUILTIN_STRENGTH: &[(i32, f64)] = &[
    // Bot lane carries
    (22, 0.89),
    (51, 0.91),
    (119, 0.86),
    (81, 0.90),
    (202, 0.94),
    (222, 0.87),
    (145, 0.91),
    (429, 0.84),
    (96, 0.88),
    (236, 0.87),
    (21, 0.93),
    (15, 0.90),
    (18, 0.89),
    (29, 0.84),
    (110, 0.85),
    (67, 0.87),
    (498, 0.87),
    // Supports
    (12, 0.88),
    (432, 0.82),
    (53, 0.86),
    (63, 0.79),
    (201, 0.93),
    (40, 0.82),
    (43, 0.89),
    (89, 0.93),
    (117, 0.89),
    (99, 0.84),
    (25, 0.89),
    (267, 0.84),
    (111, 0.88),
    (78, 0.91),
    (555, 0.88),
    (497, 0.93),
    (16, 0.87),
    (44, 0.93),
    (412, 0.87),
    (143, 0.84),
    (350, 0.86),
    // Mid laners
    (103, 0.92),
    (84, 0.78),
    (1, 0.75),
    (136, 0.94),
    (268, 0.87),
    (69, 0.91),
    (42, 0.84),
    (131, 0.92),
    (245, 0.94),
    (28, 0.83),
    (105, 0.91),
    (3, 0.79),
    (74, 0.87),
    (39, 0.85),
    (38, 0.86),
    (55, 0.88),
    (10, 0.85),
    (7, 0.86),
    (127, 0.85),
    (90, 0.88),
    (61, 0.87),
    (246, 0.86),
    (13, 0.86),
    (517, 0.84),
    (134, 0.91),
    (163, 0.86),
    (91, 0.90),
    (4, 0.89),
    (112, 0.86),
    (8, 0.90),
    (157, 0.91),
    (142, 0.89),
    (238, 0.93),
    // Top laners
    (266, 0.85),
    (164, 0.85),
    (31, 0.77),
    (122, 0.89),
    (36, 0.81),
    (114, 0.87),
    (41, 0.86),
    (86, 0.92),
    (150, 0.88),
    (79, 0.84),
    (120, 0.93),
    (420, 0.91),
    (24, 0.94),
    (126, 0.86),
    (240, 0.91),
    (54, 0.91),
    (57, 0.86),
    (75, 0.91),
    (516, 0.89),
    (80, 0.84),
    (133, 0.90),
    (58, 0.89),
    (107, 0.84),
    (92, 0.91),
    (68, 0.88),
    (98, 0.86),
    (102, 0.91),
    (27, 0.89),
    (14, 0.86),
    (50, 0.89),
    (17, 0.85),
    (48, 0.84),
    (23, 0.91),
    (77, 0.90),
    (6, 0.93),
    (254, 0.91),
    (106, 0.93),
    (19, 0.85),
    (83, 0.88),
    // Junglers
    (32, 0.91),
    (60, 0.88),
    (9, 0.85),
    (104, 0.89),
    (427, 0.89),
    (59, 0.94),
    (141, 0.92),
    (85, 0.87),
    (121, 0.89),
    (203, 0.84),
    (64, 0.90),
    (11, 0.90),
    (76, 0.86),
    (56, 0.90),
    (20, 0.93),
    (2, 0.85),
    (33, 0.85),
    (421, 0.87),
    (113, 0.89),
    (35, 0.89),
    (72, 0.93),
    (5, 0.84),
    (154, 0.90),
];
