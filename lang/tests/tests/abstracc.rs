use lumen_elab::*;
use lumen_tests::*;
use pretty_assertions::assert_eq;

#[test]
fn reassembly_reorders_to_declaration_order() {
    let mut elab = new_elab();
    let type1 = elab.terms.mk_type();

    elab.with_local_decl(Name::new("A"), BinderKind::Default, type1, |elab, a| {
        elab.with_local_decl(Name::new("x"), BinderKind::Default, a, |elab, x| {
            // listed inner-first on purpose; the dependency runs a -> x
            let got = elab.mk_forall_fvars(&[x, a], x)?;
            let type1 = elab.terms.mk_type();
            let b0 = elab.terms.mk_bound(0);
            let inner = binder(elab, "x", b0, b0);
            let want = binder(elab, "A", type1, inner);
            assert_eq!(got, want);
            Ok(())
        })
    })
    .unwrap();
}

#[test]
fn lambda_reassembly_inverts_the_telescope() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    let add = c(&mut elab, "add");
    let b0 = elab.terms.mk_bound(0);
    let body = apps(&mut elab, add, &[b0, b0]);
    let lam = lambda(&mut elab, "n", nat, body);

    let rebuilt = elab
        .lambda_telescope(lam, |elab, fvars, body| elab.mk_lambda_fvars(fvars, body))
        .unwrap();
    assert_eq!(rebuilt, lam);
}

#[test]
fn let_bound_locals_reassemble_as_let_binders() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    let five = c(&mut elab, "five");

    elab.with_let_decl(Name::new("y"), nat, five, |elab, y| {
        let add = c(elab, "add");
        let body = apps(elab, add, &[y, y]);
        let got = elab.mk_lambda_fvars(&[y], body)?;

        let b0 = elab.terms.mk_bound(0);
        let add = c(elab, "add");
        let inner = apps(elab, add, &[b0, b0]);
        let nat = c(elab, "Nat");
        let five = c(elab, "five");
        let want = elab.terms.mk_let(LetBinder {
            name: Name::new("y"),
            ty: nat,
            value: five,
            body: inner,
        });
        assert_eq!(got, want);
        Ok(())
    })
    .unwrap();
}

#[test]
fn out_of_set_dependents_block_reassembly() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");

    let res: Result<()> = elab.with_local_decl(Name::new("a"), BinderKind::Default, nat, |elab, a| {
        let p = c(elab, "P");
        let p_a = apps(elab, p, &[a]);
        elab.with_local_decl(Name::new("h"), BinderKind::Default, p_a, |elab, h| {
            // abstracting `a` would capture `h`, whose type mentions it
            let err = elab.mk_forall_fvars(&[a], h).unwrap_err();
            assert!(matches!(err.error, ElabError::RevertFailure));
            Ok(())
        })
    });
    res.unwrap();
}

#[test]
fn reassembling_an_unknown_local_is_a_lookup_failure() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    // a local minted outside any context
    let stray = elab.fresh_fvar_id();
    let stray = elab.terms.mk_local(stray);
    let err = elab.mk_forall_fvars(&[stray], nat).unwrap_err();
    assert!(matches!(err.error, ElabError::UnknownFVar(_)));
}
