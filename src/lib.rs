// Copyright 2023 Remi Bernotavicius

pub mod database;
pub mod enums;
pub mod models;
pub mod validation;
