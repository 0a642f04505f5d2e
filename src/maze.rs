use std::fs;
use std::path::Path;

use crate::constants::{CELL_SIZE, DEFAULT_MAZE_LAYOUT};
use crate::error::MazeError;
use crate::types::{Direction, GridPos, PixelPos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Path,
    Teleport,
    ChaserSpawn,
    FugitiveSpawn,
}

impl CellKind {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '#' | ' ' => Some(Self::Wall),
            '.' => Some(Self::Path),
            'T' => Some(Self::Teleport),
            'C' => Some(Self::ChaserSpawn),
            'F' => Some(Self::FugitiveSpawn),
            _ => None,
        }
    }

    pub fn is_walkable(self) -> bool {
        self != CellKind::Wall
    }
}

/// Result of stepping one cell from a walkable cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MazeStep {
    pub cell: GridPos,
    /// The step crossed the left or right edge of the tunnel row.
    pub wrapped: bool,
}

#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: Vec<CellKind>,
    tunnel_row: Option<i32>,
    teleport_pairs: Vec<(GridPos, GridPos)>,
    chaser_spawns: Vec<GridPos>,
    fugitive_spawns: Vec<GridPos>,
}

impl Maze {
    pub fn builtin() -> Result<Self, MazeError> {
        Self::parse(DEFAULT_MAZE_LAYOUT)
    }

    pub fn load(path: &Path) -> Result<Self, MazeError> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parses an ASCII layout. Short rows are padded with walls.
    pub fn parse(layout: &str) -> Result<Self, MazeError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err(MazeError::Empty);
        }
        let height = rows.len();

        let mut cells = vec![CellKind::Wall; width * height];
        let mut teleports = Vec::new();
        let mut chaser_spawns = Vec::new();
        let mut fugitive_spawns = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let kind = CellKind::from_char(ch).ok_or(MazeError::UnknownCell { ch, x, y })?;
                cells[y * width + x] = kind;
                let pos = GridPos::new(x as i32, y as i32);
                match kind {
                    CellKind::Teleport => teleports.push(pos),
                    CellKind::ChaserSpawn => chaser_spawns.push(pos),
                    CellKind::FugitiveSpawn => fugitive_spawns.push(pos),
                    CellKind::Wall | CellKind::Path => {}
                }
            }
        }

        if teleports.len() % 2 != 0 {
            return Err(MazeError::UnpairedTeleports(teleports.len()));
        }
        if chaser_spawns.is_empty() {
            return Err(MazeError::MissingSpawns("chaser"));
        }
        if fugitive_spawns.is_empty() {
            return Err(MazeError::MissingSpawns("fugitive"));
        }

        let teleport_pairs = teleports
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        let width = width as i32;
        let height = height as i32;
        let tunnel_row = (0..height).find(|&y| {
            cells[(y * width) as usize].is_walkable()
                && cells[(y * width + width - 1) as usize].is_walkable()
        });

        Ok(Self {
            width,
            height,
            cells,
            tunnel_row,
            teleport_pairs,
            chaser_spawns,
            fugitive_spawns,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tunnel_row(&self) -> Option<i32> {
        self.tunnel_row
    }

    pub fn chaser_spawns(&self) -> &[GridPos] {
        &self.chaser_spawns
    }

    pub fn fugitive_spawns(&self) -> &[GridPos] {
        &self.fugitive_spawns
    }

    pub fn teleport_pairs(&self) -> &[(GridPos, GridPos)] {
        &self.teleport_pairs
    }

    pub fn cell(&self, x: i32, y: i32) -> CellKind {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return CellKind::Wall;
        }
        self.cells[(y * self.width + x) as usize]
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_walkable()
    }

    /// Neighbor cell in `dir`, with tunnel wraparound applied before the
    /// walkability check. `None` when the move is blocked.
    pub fn step(&self, from: GridPos, dir: Direction) -> Option<MazeStep> {
        let (dx, dy) = dir.delta();
        let mut x = from.x + dx;
        let y = from.y + dy;
        let mut wrapped = false;
        if self.tunnel_row == Some(y) && dy == 0 {
            if x < 0 {
                x = self.width - 1;
                wrapped = true;
            } else if x >= self.width {
                x = 0;
                wrapped = true;
            }
        }
        if !self.is_walkable(x, y) {
            return None;
        }
        Some(MazeStep {
            cell: GridPos::new(x, y),
            wrapped,
        })
    }

    pub fn walkable_steps(&self, from: GridPos) -> Vec<(Direction, MazeStep)> {
        Direction::ALL
            .iter()
            .filter_map(|&dir| self.step(from, dir).map(|step| (dir, step)))
            .collect()
    }

    pub fn teleport_partner(&self, pos: GridPos) -> Option<GridPos> {
        if self.cell(pos.x, pos.y) != CellKind::Teleport {
            return None;
        }
        self.teleport_pairs.iter().find_map(|&(a, b)| {
            if a == pos {
                Some(b)
            } else if b == pos {
                Some(a)
            } else {
                None
            }
        })
    }

    pub fn pixel_center(&self, pos: GridPos) -> PixelPos {
        PixelPos {
            x: (pos.x as f32 + 0.5) * CELL_SIZE,
            y: (pos.y as f32 + 0.5) * CELL_SIZE,
        }
    }

    /// Straight-line distance in cells. Horizontal distance wraps around when
    /// the maze has a tunnel row.
    pub fn distance(&self, a: GridPos, b: GridPos) -> f32 {
        let mut dx = (a.x - b.x).abs();
        if self.tunnel_row.is_some() {
            dx = dx.min(self.width - dx);
        }
        let dy = (a.y - b.y).abs();
        ((dx * dx + dy * dy) as f32).sqrt()
    }

    pub fn tiles(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| match self.cell(x, y) {
                        CellKind::Wall => '#',
                        CellKind::Path => '.',
                        CellKind::Teleport => 'T',
                        CellKind::ChaserSpawn => 'C',
                        CellKind::FugitiveSpawn => 'F',
                    })
                    .collect()
            })
            .collect()
    }
}
