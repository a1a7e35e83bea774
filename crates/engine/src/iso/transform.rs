pub const DEFAULT_BASE_TILE_WIDTH_PX: u32 = 64;
pub const DEFAULT_REFERENCE_RESOLUTION: (u32, u32) = (1280, 720);
pub const DEFAULT_LAYER_SPACING: f32 = 1.5;
pub const MIN_TILE_WIDTH_PX: u32 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// 2:1 isometric projection for one tile size.
///
/// `grid_to_screen` maps a grid corner `(x, y)` to the top vertex of that
/// cell's floor diamond. Each z-layer lifts the point by
/// `tile_height * layer_spacing` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoProjection {
    tile_width: f32,
    tile_height: f32,
    half_tile_width: f32,
    half_tile_height: f32,
    layer_spacing: f32,
}

impl IsoProjection {
    pub fn new(tile_width: u32, layer_spacing: f32) -> Self {
        let tile_width = tile_width.max(MIN_TILE_WIDTH_PX) as f32;
        let tile_height = tile_width * 0.5;
        let layer_spacing = if layer_spacing.is_finite() && layer_spacing > 1.0 {
            layer_spacing
        } else {
            DEFAULT_LAYER_SPACING
        };
        Self {
            tile_width,
            tile_height,
            half_tile_width: tile_width * 0.5,
            half_tile_height: tile_height * 0.5,
            layer_spacing,
        }
    }

    /// Scales `base_tile_width` by how much the display differs from the
    /// reference resolution, keeping the smaller of the two axis ratios.
    pub fn for_display(
        base_tile_width: u32,
        display_size: (u32, u32),
        reference_size: (u32, u32),
        layer_spacing: f32,
    ) -> Self {
        let scale = display_scale_factor(display_size, reference_size);
        let scaled = (base_tile_width as f32 * scale).floor();
        let tile_width = if scaled.is_finite() && scaled >= MIN_TILE_WIDTH_PX as f32 {
            scaled as u32
        } else {
            MIN_TILE_WIDTH_PX
        };
        Self::new(tile_width, layer_spacing)
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    pub fn half_tile_width(&self) -> f32 {
        self.half_tile_width
    }

    pub fn half_tile_height(&self) -> f32 {
        self.half_tile_height
    }

    pub fn layer_spacing(&self) -> f32 {
        self.layer_spacing
    }

    pub fn layer_height(&self) -> f32 {
        self.tile_height * self.layer_spacing
    }

    pub fn grid_to_screen(&self, grid_x: f32, grid_y: f32, grid_z: f32) -> Vec2 {
        Vec2 {
            x: (grid_x - grid_y) * self.half_tile_width,
            y: (grid_x + grid_y) * self.half_tile_height - grid_z * self.layer_height(),
        }
    }

    /// Inverse of the z = 0 projection. The result is fractional; a point
    /// inside the diamond of cell `(x, y)` maps into `[x, x+1) × [y, y+1)`.
    pub fn screen_to_grid(&self, screen: Vec2) -> Vec2 {
        let u = screen.x / self.half_tile_width;
        let v = screen.y / self.half_tile_height;
        Vec2 {
            x: (v + u) * 0.5,
            y: (v - u) * 0.5,
        }
    }

    pub fn screen_to_cell(&self, screen: Vec2) -> (i32, i32) {
        let grid = self.screen_to_grid(screen);
        (grid.x.floor() as i32, grid.y.floor() as i32)
    }
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_TILE_WIDTH_PX, DEFAULT_LAYER_SPACING)
    }
}

/// Projection plus the screen position of the grid origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IsoView {
    pub projection: IsoProjection,
    pub camera_offset: Vec2,
}

impl IsoView {
    pub fn new(projection: IsoProjection, camera_offset: Vec2) -> Self {
        Self {
            projection,
            camera_offset,
        }
    }

    pub fn grid_to_screen(&self, grid_x: f32, grid_y: f32, grid_z: f32) -> Vec2 {
        let local = self.projection.grid_to_screen(grid_x, grid_y, grid_z);
        local.offset(self.camera_offset.x, self.camera_offset.y)
    }

    pub fn cell_to_screen(&self, x: u32, y: u32, z: u32) -> Vec2 {
        self.grid_to_screen(x as f32, y as f32, z as f32)
    }

    pub fn screen_to_grid(&self, screen: Vec2) -> Vec2 {
        self.projection.screen_to_grid(Vec2 {
            x: screen.x - self.camera_offset.x,
            y: screen.y - self.camera_offset.y,
        })
    }
}

fn display_scale_factor(display_size: (u32, u32), reference_size: (u32, u32)) -> f32 {
    if reference_size.0 == 0 || reference_size.1 == 0 {
        return 1.0;
    }
    let sx = display_size.0 as f32 / reference_size.0 as f32;
    let sy = display_size.1 as f32 / reference_size.1 as f32;
    sx.min(sy)
}
