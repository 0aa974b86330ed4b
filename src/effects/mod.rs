/// Black overlay compositing for host surfaces.
pub mod composite;
/// Stack blur filter and its shared division tables.
pub mod stack_blur;
