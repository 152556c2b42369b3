// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Scanner Library
 * Authenticated web application security scanner core
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod errors;
pub mod scope;
pub mod types;

// Payload engine
pub mod fuzzer;

// Persistence and event streaming interfaces
pub mod events;
pub mod evidence;

// HTTP transport wrapper
pub mod http_client;

// Attack surface discovery
pub mod crawler;
pub mod headless_crawler;

// Response classification
pub mod differential;

// Active scanning modules
pub mod scanners;

// Top-level scan pipeline
pub mod controller;
