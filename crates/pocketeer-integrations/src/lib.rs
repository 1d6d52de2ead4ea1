pub mod pocket;
