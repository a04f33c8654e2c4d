mod behavior;
mod overlay;
