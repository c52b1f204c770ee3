pub mod background;
pub mod border_sampler;
pub mod box_filter;
pub mod compositor;
pub mod despeckle;
pub mod distance_alpha;
pub mod inter_area;
pub mod params;
pub mod pipeline;
pub mod summed_area_table;
