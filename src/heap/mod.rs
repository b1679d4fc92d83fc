// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! In-memory backend: a flat node arena, built once and read through
//! [`crate::navigator::Navigator`].

mod children;
mod node;
mod tree;

pub use tree::HeapTree;
