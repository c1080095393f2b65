mod keys;
mod prepare;
mod state;
mod validation;
