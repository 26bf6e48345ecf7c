//! Integration tests for component containers, nodes and cameras
