//! Locate and order entities that are dated by where they sit.
//!
//! A directory tree such as `2024/03/06.txt` carries a date spread over its
//! levels: the year in one name, the month in the next, the day in the
//! leaf. This crate rebuilds the full timestamp of every level from a
//! layout like `2006/01/02.txt`, then walks the result in time order or
//! looks up the entries for a given date.

pub mod config;
pub mod time;
pub mod voyager;
pub mod waypoint;
