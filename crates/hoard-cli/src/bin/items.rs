// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

fn main() {
    hoard_cli::main_for(hoard_app::Variant::Items);
}
