// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod settings;
pub mod staff;
pub mod venues;
pub mod templates;
pub mod assignments;
pub mod performance;
pub mod summary;
pub mod reports;
pub mod exporter;
pub mod doctor;
