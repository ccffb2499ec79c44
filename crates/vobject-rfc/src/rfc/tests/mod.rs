//! End-to-end tests: text in, trees and text out.

mod fixtures;
