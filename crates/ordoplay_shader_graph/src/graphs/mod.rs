// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node catalogues built on the core graph model.

pub mod material;
