//! One fixture-style test per scenario in spec §8, plus a few of the
//! edge cases named alongside them (namespace nesting, import-alias
//! pruning) that don't fit naturally in the inline unit tests.

use dtsx_core::process_source;

fn dts(src: &str) -> String {
    process_source(src, "fixture.ts", true, &[]).expect("process_source should succeed").dts
}

#[test]
fn scenario_function_overload_set() {
    let src = "\
export function process(a: string): string;
export function process(a: number): number;
export function process(a: any): any {
    return a;
}
";
    let out = dts(src);
    assert!(out.contains("export declare function process(a: string): string;"));
    assert!(out.contains("export declare function process(a: number): number;"));
    assert!(!out.contains("return a"));
}

#[test]
fn scenario_class_with_private_and_accessors() {
    let src = "export class C { private s: string = ''; get v(): number { return 0; } set v(n: number) {} #h = 1; }";
    let out = dts(src);
    assert!(out.contains("export declare class C"));
    assert!(out.contains("get v(): number;"));
    assert!(out.contains("set v(n: number);"));
    assert!(!out.contains("s:"));
    assert!(!out.contains("#h"));
}

#[test]
fn interface_referenced_only_by_an_exported_function_survives_pruning() {
    let src = "\
interface Options { verbose: boolean }
export function run(opts: Options): void {}
";
    let out = dts(src);
    assert!(out.contains("interface Options"));
    assert!(out.contains("export declare function run(opts: Options): void;"));
}

#[test]
fn unreferenced_interface_is_dropped() {
    let src = "\
interface Unused { x: number }
export const y = 1;
";
    let out = dts(src);
    assert!(!out.contains("Unused"));
}

#[test]
fn aliased_named_import_kept_only_when_alias_is_used() {
    let src = "import { Foo as Bar, Baz } from 'm';\nexport function f(x: Bar): void {}\n";
    let out = dts(src);
    assert!(out.contains("import { Foo as Bar } from 'm';"));
    assert!(!out.contains("Baz"));
}

#[test]
fn side_effect_import_survives_with_no_exported_bindings() {
    let src = "import 'polyfill';\nexport const x = 1;\n";
    let out = dts(src);
    assert!(out.contains("import 'polyfill';"));
}

#[test]
fn named_namespace_members_are_recursively_declared() {
    let src = "export namespace NS { export const inner: number = 1; }";
    let out = dts(src);
    assert!(out.contains("export declare namespace NS {"));
    // `declare` is only valid at file scope; a member of an already-ambient
    // namespace repeating it is invalid `.d.ts` (TS1038).
    assert!(out.contains("export const inner: number;"));
    assert!(!out.contains("export declare const inner"));
}

#[test]
fn output_has_no_function_bodies_outside_structural_positions() {
    let src = "export function f(): number { return 1 + 2; }\nexport const g = (x: number) => { return x; };\n";
    let out = dts(src);
    assert!(!out.contains("return 1"));
    assert!(out.contains("export declare function f(): number;"));
}

#[test]
fn output_is_deterministic_across_repeated_calls() {
    let src = "export const a = 1;\nexport function f(x: string): string { return x; }\n";
    assert_eq!(dts(src), dts(src));
}
