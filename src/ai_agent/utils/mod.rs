pub mod crew;
