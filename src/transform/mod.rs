pub(crate) mod blur;
pub(crate) mod effect;
pub(crate) mod point;
