use std::fmt::Write as _;

use rcp_common::dependency::ResolvedGraph;

use super::{cmake_path, var_suffix};

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn set_var(out: &mut String, name: &str, values: &[String]) {
    if values.is_empty() {
        let _ = writeln!(out, "set({name})");
    } else {
        let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
        let _ = writeln!(out, "set({name} {})", quoted.join(" "));
    }
}

fn aggregate(out: &mut String, name: &str, per_package: &[String]) {
    let refs: Vec<String> = per_package
        .iter()
        .map(|suffix| format!("${{{name}_{suffix}}}"))
        .collect();
    if refs.is_empty() {
        let _ = writeln!(out, "set({name})");
    } else {
        let _ = writeln!(out, "set({name} {})", refs.join(" "));
    }
}

/// Renders `rcpbuildinfo.cmake`, to be `include()`d by the project's
/// CMakeLists.txt before calling `rcp_basic_setup()`.
pub fn render(graph: &ResolvedGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Generated by rcp for {}. Do not edit.", graph.root);
    set_var(&mut out, "RCP_PACKAGE_NAME", &[graph.root.name().to_string()]);
    set_var(
        &mut out,
        "RCP_PACKAGE_VERSION",
        &[graph.root.version().to_string()],
    );
    let names: Vec<String> = graph
        .packages
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    set_var(&mut out, "RCP_DEPENDENCIES", &names);

    let mut suffixes = Vec::with_capacity(graph.packages.len());
    for package in &graph.packages {
        let pkg = var_suffix(package.name());
        let _ = writeln!(
            out,
            "\n# {} (package id {})",
            package.reference, package.package_id
        );
        set_var(
            &mut out,
            &format!("RCP_{pkg}_ROOT"),
            &[cmake_path(&package.root)],
        );
        set_var(
            &mut out,
            &format!("RCP_{pkg}_VERSION"),
            &[package.version().to_string()],
        );
        set_var(
            &mut out,
            &format!("RCP_INCLUDE_DIRS_{pkg}"),
            &package
                .include_dirs
                .iter()
                .map(|d| cmake_path(d))
                .collect::<Vec<_>>(),
        );
        set_var(
            &mut out,
            &format!("RCP_LIB_DIRS_{pkg}"),
            &package
                .lib_dirs
                .iter()
                .map(|d| cmake_path(d))
                .collect::<Vec<_>>(),
        );
        set_var(&mut out, &format!("RCP_LIBS_{pkg}"), &package.libs);
        set_var(&mut out, &format!("RCP_DEFINES_{pkg}"), &package.defines);
        for (option, value) in &package.options {
            set_var(
                &mut out,
                &format!("RCP_OPTIONS_{pkg}_{}", var_suffix(option)),
                &[value.to_string()],
            );
        }
        suffixes.push(pkg);
    }

    out.push('\n');
    aggregate(&mut out, "RCP_INCLUDE_DIRS", &suffixes);
    aggregate(&mut out, "RCP_LIB_DIRS", &suffixes);
    aggregate(&mut out, "RCP_LIBS", &suffixes);
    aggregate(&mut out, "RCP_DEFINES", &suffixes);

    out.push_str(
        "\nmacro(rcp_basic_setup)\n    \
         include_directories(${RCP_INCLUDE_DIRS})\n    \
         link_directories(${RCP_LIB_DIRS})\n    \
         add_compile_definitions(${RCP_DEFINES})\n\
         endmacro()\n",
    );
    out
}
